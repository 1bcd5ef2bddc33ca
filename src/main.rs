mod app;
mod controller;
mod draft;
mod error;
mod ingest;
mod model;
mod render;
mod router;
mod session;
mod settings;
mod store;

use app::*;
use leptos::prelude::*;
use settings::BlogSettings;

fn main() {
    console_error_panic_hook::set_once();
    let (settings, load_error) = match BlogSettings::load() {
        Ok(settings) => (settings, None),
        Err(err) => (BlogSettings::default().with_env_overrides(), Some(err)),
    };
    if let Err(err) = console_log::init_with_level(settings.log_level()) {
        web_sys::console::warn_1(&format!("logger already initialised: {err}").into());
    }
    if let Some(err) = load_error {
        log::warn!("falling back to default settings: {err}");
    }
    log::info!("{} starting", settings.site_title);
    mount_to_body(move || {
        view! { <App settings=settings.clone()/> }
    })
}
