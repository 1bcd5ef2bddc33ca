use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use crate::controller::BlogApp;
use crate::draft::{DraftField, Format, PostDraft};
use crate::ingest::{self, Placement};
use crate::model::{CategoryFilter, Post, PostId, Seed};
use crate::render::render_body;
use crate::router::{NavAction, View};
use crate::settings::BlogSettings;

type AppState = RwSignal<BlogApp>;

fn app_state() -> AppState {
    expect_context::<AppState>()
}

fn is_enter(ev: &KeyboardEvent) -> bool {
    ev.key() == "Enter"
}

/// Loads a picked or pasted file and splices it into the open draft once the
/// bytes are in.
fn ingest_image(
    app: AppState,
    file: web_sys::File,
    placement: Placement,
    on_inserted: impl FnOnce() + 'static,
) {
    spawn_local(async move {
        let image = match ingest::read_image(file).await {
            Ok(image) => image,
            Err(err) => {
                log::warn!("image skipped: {err}");
                return;
            }
        };
        match app.try_update(|a| a.insert_image(&image, placement)) {
            Some(Err(err)) => log::warn!("image not inserted: {err}"),
            Some(Ok(())) => on_inserted(),
            None => {}
        }
    });
}

#[component]
pub fn App(settings: BlogSettings) -> impl IntoView {
    let page_style = format!(
        "min-height: 100vh; display: flex; flex-direction: column; background: var(--bg-primary); color: var(--text-primary); {}",
        settings.theme.css_variables()
    );
    let app: AppState = RwSignal::new(BlogApp::new(settings, Seed::bundled()));
    provide_context(app);

    // Only re-render the screen when the route changes, not on every keystroke.
    let route = Memo::new(move |_| app.with(|a| (a.login_open(), a.view())));

    let screen = move || {
        let (login_open, view) = route.get();
        if login_open {
            return view! { <LoginScreen/> }.into_any();
        }
        match view {
            View::Home => view! { <HomeScreen/> }.into_any(),
            View::Post(_) => view! { <PostScreen/> }.into_any(),
            View::Editor(_) => view! { <EditorScreen/> }.into_any(),
            View::Admin => view! { <AdminScreen/> }.into_any(),
            View::Categories => view! { <CategoriesScreen/> }.into_any(),
        }
    };

    view! {
        <div class="app-layout" style=page_style>
            <Header/>
            <main style="flex: 1;">{screen}</main>
            <Footer/>
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    let app = app_state();
    let (menu_open, set_menu_open) = signal(false);
    let is_admin = move || app.with(|a| a.is_admin());
    let site_title = app.with_untracked(|a| a.settings().site_title.clone());

    let nav_buttons = move |close_menu: bool| {
        let close = move || {
            if close_menu {
                set_menu_open.set(false);
            }
        };
        if is_admin() {
            view! {
                <button class="nav-button" on:click=move |_| { app.update(|a| a.navigate(NavAction::OpenAdmin)); close(); }>
                    "Dashboard"
                </button>
                <button class="nav-button danger" on:click=move |_| { app.update(|a| a.logout()); close(); }>
                    "Logout"
                </button>
            }
            .into_any()
        } else {
            view! {
                <button class="nav-button" on:click=move |_| { app.update(|a| a.navigate(NavAction::ShowLogin)); close(); }>
                    "Admin"
                </button>
            }
            .into_any()
        }
    };

    view! {
        <header class="topbar">
            <div class="topbar-inner">
                <button class="brand" on:click=move |_| app.update(|a| a.navigate(NavAction::GoHome))>
                    {site_title}
                </button>
                <nav class="desktop-nav">{move || nav_buttons(false)}</nav>
                <button
                    class="menu-toggle"
                    title="Menu"
                    on:click=move |_| set_menu_open.update(|open| *open = !*open)
                >
                    {move || if menu_open.get() { "✕" } else { "☰" }}
                </button>
            </div>
            {move || menu_open.get().then(|| view! { <nav class="mobile-nav">{nav_buttons(true)}</nav> })}
        </header>
    }
}

#[component]
fn Footer() -> impl IntoView {
    let app = app_state();
    let text = app.with_untracked(|a| a.settings().footer_text.clone());
    view! {
        <footer class="footer">
            <p>{text}</p>
        </footer>
    }
}

#[component]
fn AdminPostControls(id: PostId) -> impl IntoView {
    let app = app_state();
    view! {
        <div class="post-controls">
            <button
                class="icon-button"
                title="Edit"
                on:click=move |ev| {
                    ev.stop_propagation();
                    app.update(|a| a.edit_post(id));
                }
            >
                "✎"
            </button>
            <button
                class="icon-button danger"
                title="Delete"
                on:click=move |ev| {
                    ev.stop_propagation();
                    app.update(|a| a.delete_post(id));
                }
            >
                "🗑"
            </button>
        </div>
    }
}

#[component]
fn HomeScreen() -> impl IntoView {
    let app = app_state();
    let (journal_title, tagline) = app.with_untracked(|a| {
        let s = a.settings();
        (s.journal_title.clone(), s.tagline.clone())
    });
    let posts = Memo::new(move |_| app.with(|a| a.visible_posts()));
    let categories = Memo::new(move |_| app.with(|a| a.store().categories().to_vec()));
    let filter = Memo::new(move |_| app.with(|a| a.filter().clone()));
    let is_admin = Memo::new(move |_| app.with(|a| a.is_admin()));

    let filter_button = move |label: String, target: CategoryFilter| {
        let active_target = target.clone();
        let is_active = move || filter.get() == active_target;
        view! {
            <button
                class="chip"
                class:active=is_active
                on:click=move |_| {
                    let target = target.clone();
                    app.update(|a| a.select_category(target));
                }
            >
                {label}
            </button>
        }
    };

    let card = move |post: Post| {
        let id = post.id;
        view! {
            <article class="post-card" on:click=move |_| app.update(|a| a.open_post(id))>
                <div class="post-meta">
                    <span class="badge">{post.category}</span>
                    <span class="muted">{post.date}</span>
                </div>
                <h2 class="post-card-title">{post.title}</h2>
                <p class="post-card-excerpt">{post.excerpt}</p>
                <div class="post-card-footer">
                    <span class="muted">{post.read_time}</span>
                    {move || is_admin.get().then(|| view! { <AdminPostControls id=id/> })}
                </div>
            </article>
        }
    };

    view! {
        <div class="page">
            <div class="hero">
                <h1 class="hero-title">{journal_title}</h1>
                <p class="muted">{tagline}</p>
            </div>
            <div class="chip-row">
                {filter_button("All".to_string(), CategoryFilter::All)}
                {move || {
                    categories
                        .get()
                        .into_iter()
                        .map(|c| filter_button(c.clone(), CategoryFilter::Named(c)))
                        .collect::<Vec<_>>()
                }}
            </div>
            <div class="post-grid">
                {move || posts.get().into_iter().map(card).collect::<Vec<_>>()}
            </div>
        </div>
    }
}

#[component]
fn PostScreen() -> impl IntoView {
    let app = app_state();
    let mode = app.with_untracked(|a| a.settings().render_mode);
    let post = Memo::new(move |_| app.with(|a| a.current_post().cloned()));
    let is_admin = Memo::new(move |_| app.with(|a| a.is_admin()));

    move || match post.get() {
        None => view! { <HomeScreen/> }.into_any(),
        Some(post) => {
            let id = post.id;
            let body = render_body(&post.content, mode);
            view! {
                <div class="page narrow">
                    <button class="back-link" on:click=move |_| app.update(|a| a.navigate(NavAction::GoHome))>
                        "← Back to posts"
                    </button>
                    <article class="post-detail">
                        <div class="post-meta">
                            <span class="badge">{post.category}</span>
                            <span class="muted">{post.date}</span>
                        </div>
                        <h1 class="post-title">{post.title}</h1>
                        <p class="post-excerpt">{post.excerpt}</p>
                        <div class="post-body" inner_html=body></div>
                        {move || {
                            is_admin
                                .get()
                                .then(|| {
                                    view! {
                                        <div class="action-row">
                                            <button class="primary" on:click=move |_| app.update(|a| a.edit_post(id))>
                                                "Edit Post"
                                            </button>
                                            <button class="danger" on:click=move |_| app.update(|a| a.delete_post(id))>
                                                "Delete Post"
                                            </button>
                                        </div>
                                    }
                                })
                        }}
                    </article>
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn EditorScreen() -> impl IntoView {
    let app = app_state();
    let is_new = app.with_untracked(|a| a.draft().map_or(true, |d| d.is_new()));
    let categories = Memo::new(move |_| app.with(|a| a.store().categories().to_vec()));
    let body_ref = NodeRef::<leptos::html::Textarea>::new();

    // The textarea value is patched by a render effect, so the caret is put
    // back on the next frame.
    let restore_caret = move || {
        request_animation_frame(move || {
            let Some(textarea) = body_ref.get_untracked() else {
                return;
            };
            let (start, end) = app.with_untracked(|a| {
                a.draft()
                    .map(|d| d.body.selection_utf16())
                    .unwrap_or_default()
            });
            let _ = textarea.focus();
            let _ = textarea.set_selection_range(start, end);
        });
    };

    let field = move |get: fn(&PostDraft) -> String| {
        move || app.with(|a| a.draft().map(get).unwrap_or_default())
    };
    let set_field = move |field: DraftField| {
        move |ev: web_sys::Event| {
            let value = event_target_value(&ev);
            app.update(|a| a.set_draft_field(field, value));
        }
    };

    let sync_selection = move |ev: &web_sys::Event| {
        let textarea: HtmlTextAreaElement = event_target(ev);
        let start = textarea.selection_start().ok().flatten().unwrap_or(0);
        let end = textarea.selection_end().ok().flatten().unwrap_or(start);
        (textarea.value(), start, end)
    };

    let on_body_input = move |ev: web_sys::Event| {
        let (text, start, end) = sync_selection(&ev);
        app.update(|a| a.set_body_input(text, (start, end)));
    };
    let on_body_caret = move |ev: web_sys::Event| {
        let (_, start, end) = sync_selection(&ev);
        app.update(|a| a.set_body_selection(start, end));
    };
    let on_paste = move |ev: web_sys::Event| {
        let Some(file) = ev
            .dyn_ref::<ClipboardEvent>()
            .and_then(ingest::clipboard_image)
        else {
            return;
        };
        ev.prevent_default();
        let (_, start, end) = sync_selection(&ev);
        app.update(|a| a.set_body_selection(start, end));
        ingest_image(app, file, Placement::AtCaret, restore_caret);
    };
    let on_upload = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = ingest::picked_file(&input) {
            ingest_image(app, file, Placement::End, restore_caret);
        }
        input.set_value("");
    };
    let on_format = move |format: Format| {
        match app.try_update(|a| a.format_body(format)) {
            Some(Err(err)) => log::warn!("formatting failed: {err}"),
            Some(Ok(())) => restore_caret(),
            None => {}
        }
    };

    view! {
        <div class="page narrow">
            <button class="back-link" on:click=move |_| app.update(|a| a.cancel_editor())>
                "← Back to posts"
            </button>
            <div class="panel">
                <h2>{if is_new { "Create New Post" } else { "Edit Post" }}</h2>
                <label class="field">
                    <span>"Title"</span>
                    <input
                        type="text"
                        placeholder="Enter post title"
                        prop:value=field(|d| d.title.clone())
                        on:input=set_field(DraftField::Title)
                    />
                </label>
                <label class="field">
                    <span>"Excerpt"</span>
                    <textarea
                        rows="3"
                        placeholder="Brief summary of your post"
                        prop:value=field(|d| d.excerpt.clone())
                        on:input=set_field(DraftField::Excerpt)
                    ></textarea>
                </label>
                <div class="field">
                    <span>"Content"</span>
                    <small class="muted">"Paste images directly or use the upload button below"</small>
                    <div class="toolbar">
                        {Format::ALL
                            .into_iter()
                            .map(|format| {
                                view! {
                                    <button class="icon-button" title=format.title() on:click=move |_| on_format(format)>
                                        {format.label()}
                                    </button>
                                }
                            })
                            .collect::<Vec<_>>()}
                    </div>
                    <textarea
                        node_ref=body_ref
                        class="body-editor"
                        placeholder="Write your full post content here... You can paste images directly!"
                        spellcheck="false"
                        prop:value=field(|d| d.body.text().to_string())
                        on:input=on_body_input
                        on:select=on_body_caret
                        on:click=move |ev| on_body_caret(ev.into())
                        on:keyup=move |ev| on_body_caret(ev.into())
                        on:paste=on_paste
                    ></textarea>
                    <label class="upload-button">
                        "Upload Image"
                        <input type="file" accept="image/*" style="display: none;" on:change=on_upload/>
                    </label>
                    <small class="muted">"Supported formats: JPG, PNG, GIF"</small>
                </div>
                <div class="field-row">
                    <label class="field">
                        <span>"Category"</span>
                        <select prop:value=field(|d| d.category.clone()) on:change=set_field(DraftField::Category)>
                            {move || {
                                categories
                                    .get()
                                    .into_iter()
                                    .map(|c| {
                                        let value = c.clone();
                                        view! { <option value=value>{c}</option> }
                                    })
                                    .collect::<Vec<_>>()
                            }}
                        </select>
                    </label>
                    <label class="field">
                        <span>"Date"</span>
                        <input type="date" prop:value=field(|d| d.date.clone()) on:input=set_field(DraftField::Date)/>
                    </label>
                </div>
                <div class="action-row end">
                    <button class="secondary" on:click=move |_| app.update(|a| a.cancel_editor())>
                        "Cancel"
                    </button>
                    <button class="primary" on:click=move |_| app.update(|a| { a.save_post(); })>
                        {if is_new { "Publish Post" } else { "Update Post" }}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn AdminScreen() -> impl IntoView {
    let app = app_state();
    let stats = Memo::new(move |_| app.with(|a| a.stats()));
    let recent = Memo::new(move |_| app.with(|a| a.recent_posts().to_vec()));

    view! {
        <div class="page">
            <div class="panel">
                <div class="panel-header">
                    <h2>"Admin Dashboard"</h2>
                    <button class="nav-button danger" on:click=move |_| app.update(|a| a.logout())>
                        "Logout"
                    </button>
                </div>
                <div class="stat-grid">
                    <div class="stat-card">
                        <div class="stat-value">{move || stats.get().posts}</div>
                        <div>"Total Posts"</div>
                    </div>
                    <div class="stat-card">
                        <div class="stat-value">{move || stats.get().categories}</div>
                        <div>"Categories"</div>
                    </div>
                    <div class="stat-card">
                        <div class="stat-value">{move || stats.get().admin_users}</div>
                        <div>"Admin User"</div>
                    </div>
                </div>
                <div class="action-row">
                    <button class="primary" on:click=move |_| app.update(|a| a.new_post())>
                        "+ Create New Post"
                    </button>
                    <button class="secondary" on:click=move |_| app.update(|a| a.navigate(NavAction::OpenCategories))>
                        "Manage Categories"
                    </button>
                    <button class="secondary" on:click=move |_| app.update(|a| a.navigate(NavAction::GoHome))>
                        "View Blog"
                    </button>
                </div>
            </div>
            <div class="panel">
                <h3>"Recent Posts"</h3>
                {move || {
                    recent
                        .get()
                        .into_iter()
                        .map(|post| {
                            let id = post.id;
                            view! {
                                <div class="list-row">
                                    <div>
                                        <h4>{post.title}</h4>
                                        <p class="muted">{format!("{} • {}", post.category, post.date)}</p>
                                    </div>
                                    <AdminPostControls id=id/>
                                </div>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </div>
        </div>
    }
}

#[component]
fn CategoriesScreen() -> impl IntoView {
    let app = app_state();
    let categories = Memo::new(move |_| app.with(|a| a.store().categories().to_vec()));

    let add = move || {
        if let Some(Err(err)) = app.try_update(|a| a.add_category()) {
            log::debug!("category not added: {err}");
        }
    };
    let save_rename = move || {
        if let Some(Err(err)) = app.try_update(|a| a.save_rename()) {
            log::debug!("category not renamed: {err}");
        }
    };
    let delete = move |name: String| {
        let message = format!(
            "Delete category \"{name}\"? All posts in this category will be moved to \"{}\".",
            app.with_untracked(|a| a.store().fallback_category().to_string())
        );
        if !window().confirm_with_message(&message).unwrap_or(false) {
            return;
        }
        if let Some(Err(err)) = app.try_update(|a| a.delete_category(&name)) {
            log::debug!("category not deleted: {err}");
        }
    };

    let row = move |category: String| {
        let renaming = {
            let category = category.clone();
            Memo::new(move |_| app.with(|a| a.category_draft().is_renaming(&category)))
        };
        let label = category.clone();
        let edit_target = category.clone();
        view! {
            <div class="list-row">
                {move || {
                    if renaming.get() {
                        view! {
                            <input
                                type="text"
                                autofocus=true
                                prop:value=move || {
                                    app.with(|a| {
                                        a.category_draft()
                                            .renaming
                                            .as_ref()
                                            .map(|(_, name)| name.clone())
                                            .unwrap_or_default()
                                    })
                                }
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    app.update(|a| a.set_rename_input(value));
                                }
                                on:keydown=move |ev| {
                                    if is_enter(&ev) {
                                        save_rename();
                                    } else if ev.key() == "Escape" {
                                        app.update(|a| a.cancel_rename());
                                    }
                                }
                            />
                        }
                        .into_any()
                    } else {
                        view! { <span>{label.clone()}</span> }.into_any()
                    }
                }}
                <div class="post-controls">
                    {move || {
                        if renaming.get() {
                            view! {
                                <button class="icon-button" title="Save" on:click=move |_| save_rename()>
                                    "💾"
                                </button>
                            }
                            .into_any()
                        } else {
                            let target = edit_target.clone();
                            view! {
                                <button
                                    class="icon-button"
                                    title="Rename"
                                    on:click=move |_| app.update(|a| a.start_rename(&target))
                                >
                                    "✎"
                                </button>
                            }
                            .into_any()
                        }
                    }}
                    <button class="icon-button danger" title="Delete" on:click=move |_| delete(category.clone())>
                        "🗑"
                    </button>
                </div>
            </div>
        }
    };

    view! {
        <div class="page narrow">
            <div class="panel">
                <div class="panel-header">
                    <h2>"Manage Categories"</h2>
                    <button class="back-link" on:click=move |_| app.update(|a| a.navigate(NavAction::OpenAdmin))>
                        "← Back to Dashboard"
                    </button>
                </div>
                <div class="inline-form">
                    <input
                        type="text"
                        placeholder="Enter new category name"
                        prop:value=move || app.with(|a| a.category_draft().new_name.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            app.update(|a| a.set_new_category_input(value));
                        }
                        on:keydown=move |ev| {
                            if is_enter(&ev) {
                                add();
                            }
                        }
                    />
                    <button class="primary" on:click=move |_| add()>
                        "+ Add"
                    </button>
                </div>
                <h3>{move || format!("Existing Categories ({})", categories.get().len())}</h3>
                {move || categories.get().into_iter().map(row).collect::<Vec<_>>()}
            </div>
        </div>
    }
}

#[component]
fn LoginScreen() -> impl IntoView {
    let app = app_state();
    let submit = move || {
        if let Some(Err(err)) = app.try_update(|a| a.submit_login()) {
            log::info!("admin login rejected: {err}");
            let _ = window().alert_with_message("Invalid password");
        }
    };

    view! {
        <div class="page login">
            <div class="panel centered">
                <div class="lock">"🔒"</div>
                <h2>"Admin Login"</h2>
                <p class="muted">"Enter your admin credentials"</p>
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || app.with(|a| a.session().password_input.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        app.update(|a| a.set_password_input(value));
                    }
                    on:keydown=move |ev| {
                        if is_enter(&ev) {
                            submit();
                        }
                    }
                />
                <button class="primary wide" on:click=move |_| submit()>
                    "Login"
                </button>
                <button class="secondary wide" on:click=move |_| app.update(|a| a.navigate(NavAction::HideLogin))>
                    "Cancel"
                </button>
                <p class="hint">"Logging in only reveals the edit controls."</p>
            </div>
        </div>
    }
}
