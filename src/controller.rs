use crate::draft::{CategoryDraft, DraftField, EditorTarget, Format, PostDraft};
use crate::error::{BlogError, CategoryError, IngestError, LoginError};
use crate::ingest::{ImageFile, Placement, PASTED_IMAGE_ALT};
use crate::model::{self, CategoryFilter, Post, PostId, Seed};
use crate::router::{NavAction, Router, View};
use crate::session::Session;
use crate::settings::BlogSettings;
use crate::store::{BlogStats, BlogStore};

/// All state of the blog and the only place it changes.
///
/// The admin flag is never consulted here; it only decides which controls the
/// view renders.
#[derive(Clone, Debug)]
pub struct BlogApp {
    settings: BlogSettings,
    store: BlogStore,
    filter: CategoryFilter,
    router: Router,
    session: Session,
    draft: Option<PostDraft>,
    category_draft: CategoryDraft,
}

impl BlogApp {
    pub fn new(settings: BlogSettings, seed: Seed) -> Self {
        let store = BlogStore::new(seed, settings.fallback_category.clone());
        Self {
            settings,
            store,
            filter: CategoryFilter::All,
            router: Router::default(),
            session: Session::default(),
            draft: None,
            category_draft: CategoryDraft::default(),
        }
    }

    pub fn settings(&self) -> &BlogSettings {
        &self.settings
    }

    pub fn store(&self) -> &BlogStore {
        &self.store
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn view(&self) -> View {
        self.router.view()
    }

    pub fn login_open(&self) -> bool {
        self.router.login_open()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn draft(&self) -> Option<&PostDraft> {
        self.draft.as_ref()
    }

    pub fn category_draft(&self) -> &CategoryDraft {
        &self.category_draft
    }

    pub fn visible_posts(&self) -> Vec<Post> {
        self.store
            .filter_by_category(&self.filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The post on the detail view, if it still exists.
    pub fn current_post(&self) -> Option<&Post> {
        match self.router.view() {
            View::Post(id) => self.store.get(id),
            _ => None,
        }
    }

    pub fn recent_posts(&self) -> &[Post] {
        self.store.recent(self.settings.recent_posts_limit)
    }

    pub fn stats(&self) -> BlogStats {
        self.store.stats()
    }

    pub fn select_category(&mut self, filter: CategoryFilter) {
        log::debug!("filter posts by {filter:?}");
        self.filter = filter;
    }

    /// Plain jumps that touch nothing but the router.
    pub fn navigate(&mut self, action: NavAction) {
        self.router.apply(action);
    }

    pub fn open_post(&mut self, id: PostId) {
        self.router.apply(NavAction::OpenPost(id));
    }

    pub fn edit_post(&mut self, id: PostId) {
        let Some(post) = self.store.get(id) else {
            return;
        };
        self.draft = Some(PostDraft::from_post(post));
        self.router.apply(NavAction::EditPost(id));
    }

    pub fn new_post(&mut self) {
        let category = self
            .store
            .categories()
            .first()
            .cloned()
            .unwrap_or_else(|| self.settings.fallback_category.clone());
        self.draft = Some(PostDraft::blank(category, model::today()));
        self.router.apply(NavAction::NewPost);
    }

    pub fn cancel_editor(&mut self) {
        self.draft = None;
        self.router.apply(NavAction::CancelEditor);
    }

    /// Commits the open draft. Returns the id of the published or updated post.
    pub fn save_post(&mut self) -> Option<PostId> {
        let draft = self.draft.take()?;
        let id = match draft.target {
            EditorTarget::New => {
                let post = self.store.create(draft.fields());
                log::info!("post {} published", post.id);
                post.id
            }
            EditorTarget::Existing(id) => {
                if self.store.update(id, draft.fields()) {
                    log::info!("post {id} updated");
                }
                id
            }
        };
        self.router.apply(NavAction::SavedPost);
        Some(id)
    }

    pub fn delete_post(&mut self, id: PostId) {
        if self.store.delete(id) {
            log::info!("post {id} deleted");
        }
        self.router.apply(NavAction::PostDeleted(id));
    }

    pub fn set_draft_field(&mut self, field: DraftField, value: String) {
        if let Some(draft) = self.draft.as_mut() {
            draft.set(field, value);
        }
    }

    /// Mirrors the body textarea after an `input` event.
    pub fn set_body_input(&mut self, text: String, selection_utf16: (u32, u32)) {
        if let Some(draft) = self.draft.as_mut() {
            draft.body.replace_from_input(text);
            draft.body.set_selection_utf16(selection_utf16.0, selection_utf16.1);
        }
    }

    pub fn set_body_selection(&mut self, start_utf16: u32, end_utf16: u32) {
        if let Some(draft) = self.draft.as_mut() {
            draft.body.set_selection_utf16(start_utf16, end_utf16);
        }
    }

    pub fn format_body(&mut self, format: Format) -> Result<(), BlogError> {
        if let Some(draft) = self.draft.as_mut() {
            draft.body.format(format)?;
        }
        Ok(())
    }

    pub fn insert_image(&mut self, image: &ImageFile, placement: Placement) -> Result<(), BlogError> {
        let draft = self.draft.as_mut().ok_or(IngestError::NoDraft)?;
        match placement {
            Placement::AtCaret => draft.body.insert_at_selection(&image.markdown_tag(PASTED_IMAGE_ALT))?,
            Placement::End => draft.body.append(&image.markdown_tag(&image.name))?,
        };
        log::info!(
            "embedded {} ({} bytes) into draft body",
            image.mime,
            image.bytes.len()
        );
        Ok(())
    }

    pub fn set_password_input(&mut self, value: String) {
        self.session.password_input = value;
    }

    pub fn submit_login(&mut self) -> Result<(), LoginError> {
        self.session.login(&self.settings.admin_password)?;
        self.router.apply(NavAction::HideLogin);
        log::info!("admin controls enabled");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.router.apply(NavAction::Logout);
        log::info!("admin controls disabled");
    }

    pub fn set_new_category_input(&mut self, value: String) {
        self.category_draft.new_name = value;
    }

    pub fn add_category(&mut self) -> Result<String, CategoryError> {
        let name = self.store.add_category(&self.category_draft.new_name)?;
        self.category_draft.new_name.clear();
        log::info!("category {name:?} added");
        Ok(name)
    }

    pub fn start_rename(&mut self, category: &str) {
        self.category_draft.start_rename(category);
    }

    pub fn set_rename_input(&mut self, value: String) {
        if let Some((_, name)) = self.category_draft.renaming.as_mut() {
            *name = value;
        }
    }

    /// Commits the rename in progress. The rename field closes whether or not
    /// the new name was accepted.
    pub fn save_rename(&mut self) -> Result<String, CategoryError> {
        let Some((old, new)) = self.category_draft.renaming.take() else {
            return Err(CategoryError::NotRenaming);
        };
        let new = self.store.rename_category(&old, &new)?;
        if self.filter.is_named(&old) {
            self.filter = CategoryFilter::Named(new.clone());
        }
        if let Some(draft) = self.draft.as_mut().filter(|d| d.category == old) {
            draft.category = new.clone();
        }
        self.reconcile_draft_category();
        log::info!("category {old:?} renamed to {new:?}");
        Ok(new)
    }

    pub fn cancel_rename(&mut self) {
        self.category_draft.renaming = None;
    }

    /// Deletes a category the reader already confirmed.
    pub fn delete_category(&mut self, name: &str) -> Result<usize, CategoryError> {
        let moved = self.store.delete_category(name)?;
        if self.filter.is_named(name) {
            self.filter = CategoryFilter::All;
        }
        if self.category_draft.is_renaming(name) {
            self.category_draft.renaming = None;
        }
        let fallback = self.settings.fallback_category.clone();
        if let Some(draft) = self.draft.as_mut().filter(|d| d.category == name) {
            draft.category = fallback;
        }
        self.reconcile_draft_category();
        log::info!("category {name:?} deleted, {moved} post(s) moved");
        Ok(moved)
    }

    fn reconcile_draft_category(&mut self) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        if self.store.has_category(&draft.category) {
            return;
        }
        draft.category = self
            .store
            .categories()
            .first()
            .cloned()
            .unwrap_or_else(|| self.settings.fallback_category.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Selection;

    fn app() -> BlogApp {
        BlogApp::new(BlogSettings::default(), Seed::bundled())
    }

    fn visible_ids(app: &BlogApp) -> Vec<PostId> {
        app.visible_posts().iter().map(|p| p.id).collect()
    }

    fn png() -> ImageFile {
        ImageFile {
            name: "chart.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn productivity_filter_then_delete_viewed_post() {
        let mut app = app();
        app.select_category(CategoryFilter::Named("Productivity".to_string()));
        assert_eq!(visible_ids(&app), vec![1, 3]);

        app.select_category(CategoryFilter::All);
        app.open_post(2);
        assert_eq!(app.current_post().map(|p| p.id), Some(2));
        app.delete_post(2);
        assert_eq!(app.view(), View::Home);
        assert_eq!(visible_ids(&app), vec![1, 3]);
    }

    #[test]
    fn new_post_starts_blank_with_today_and_first_category() {
        let mut app = app();
        app.new_post();
        let draft = app.draft().unwrap();
        assert!(draft.is_new());
        assert_eq!(draft.category, "Productivity");
        assert_eq!(draft.date, model::today());
        assert!(draft.title.is_empty());
        assert!(draft.body.text().is_empty());
        assert_eq!(app.view(), View::Editor(EditorTarget::New));
    }

    #[test]
    fn publishing_prepends_and_returns_home() {
        let mut app = app();
        app.new_post();
        app.set_draft_field(DraftField::Title, "Fresh".to_string());
        app.set_body_input("Hello".to_string(), (5, 5));
        let id = app.save_post().unwrap();
        assert_eq!(id, 4);
        assert_eq!(app.view(), View::Home);
        assert!(app.draft().is_none());
        let first = &app.visible_posts()[0];
        assert_eq!((first.id, first.title.as_str(), first.content.as_str()), (4, "Fresh", "Hello"));
    }

    #[test]
    fn editing_updates_in_place() {
        let mut app = app();
        app.edit_post(3);
        assert_eq!(app.draft().unwrap().title, "Goal Setting Frameworks That Actually Work");
        app.set_draft_field(DraftField::Category, "Career".to_string());
        assert_eq!(app.save_post(), Some(3));
        assert_eq!(app.store().get(3).unwrap().category, "Career");
        assert_eq!(visible_ids(&app), vec![1, 2, 3]);
    }

    #[test]
    fn editing_missing_post_is_a_noop() {
        let mut app = app();
        app.edit_post(99);
        assert!(app.draft().is_none());
        assert_eq!(app.view(), View::Home);
    }

    #[test]
    fn cancel_discards_draft() {
        let mut app = app();
        app.edit_post(1);
        app.set_draft_field(DraftField::Title, "scratch".to_string());
        app.cancel_editor();
        assert!(app.draft().is_none());
        assert_eq!(app.store().get(1).unwrap().title, "Building Consistent Habits for Success");
    }

    #[test]
    fn operations_ignore_admin_flag() {
        let mut app = app();
        assert!(!app.is_admin());
        app.delete_post(1);
        app.new_post();
        assert!(app.save_post().is_some());
        app.add_category_named("Hobbies");
        assert!(app.store().has_category("Hobbies"));

        app.set_password_input("admin0321".to_string());
        app.submit_login().unwrap();
        assert!(app.is_admin());
        app.delete_post(2);
        assert!(app.store().get(2).is_none());
    }

    #[test]
    fn wrong_password_keeps_overlay_open() {
        let mut app = app();
        app.navigate(NavAction::ShowLogin);
        app.set_password_input("nope".to_string());
        assert_eq!(app.submit_login(), Err(LoginError::InvalidPassword));
        assert!(app.login_open());
        assert_eq!(app.session().password_input, "nope");

        app.set_password_input("admin0321".to_string());
        app.submit_login().unwrap();
        assert!(!app.login_open());
    }

    #[test]
    fn logout_goes_home() {
        let mut app = app();
        app.set_password_input("admin0321".to_string());
        app.submit_login().unwrap();
        app.navigate(NavAction::OpenAdmin);
        app.logout();
        assert!(!app.is_admin());
        assert_eq!(app.view(), View::Home);
    }

    #[test]
    fn rename_follows_filter_and_draft() {
        let mut app = app();
        app.select_category(CategoryFilter::Named("Productivity".to_string()));
        app.new_post();
        app.start_rename("Productivity");
        app.set_rename_input("  Focus ".to_string());
        assert_eq!(app.save_rename(), Ok("Focus".to_string()));
        assert_eq!(app.filter(), &CategoryFilter::Named("Focus".to_string()));
        assert_eq!(app.draft().unwrap().category, "Focus");
        assert_eq!(visible_ids(&app), vec![1, 3]);
        assert!(app.category_draft().renaming.is_none());
    }

    #[test]
    fn rejected_rename_still_closes_field() {
        let mut app = app();
        app.start_rename("Career");
        app.set_rename_input("".to_string());
        assert_eq!(app.save_rename(), Err(CategoryError::EmptyName));
        assert!(app.category_draft().renaming.is_none());
        assert!(app.store().has_category("Career"));
    }

    #[test]
    fn delete_category_resets_filter_and_moves_draft() {
        let mut app = app();
        app.select_category(CategoryFilter::Named("Productivity".to_string()));
        app.new_post();
        assert_eq!(app.delete_category("Productivity"), Ok(2));
        assert_eq!(app.filter(), &CategoryFilter::All);
        assert_eq!(app.draft().unwrap().category, "Uncategorized");
        let fallback = app
            .store()
            .categories()
            .iter()
            .filter(|c| *c == "Uncategorized")
            .count();
        assert_eq!(fallback, 1);
    }

    #[test]
    fn add_category_clears_input_only_on_success() {
        let mut app = app();
        app.set_new_category_input("Career".to_string());
        assert!(app.add_category().is_err());
        assert_eq!(app.category_draft().new_name, "Career");
        app.set_new_category_input(" Travel ".to_string());
        assert_eq!(app.add_category(), Ok("Travel".to_string()));
        assert!(app.category_draft().new_name.is_empty());
    }

    #[test]
    fn pasted_image_goes_to_caret_uploaded_to_end() {
        let mut app = app();
        app.new_post();
        app.set_body_input("top bottom".to_string(), (3, 3));
        app.insert_image(&png(), Placement::AtCaret).unwrap();
        app.insert_image(&png(), Placement::End).unwrap();
        let body = app.draft().unwrap().body.text().to_string();
        assert_eq!(
            body,
            "top\n![Image](data:image/png;base64,AQID)\n bottom\n![chart.png](data:image/png;base64,AQID)\n"
        );
    }

    #[test]
    fn repeated_uploads_are_not_deduplicated() {
        let mut app = app();
        app.edit_post(3);
        app.insert_image(&png(), Placement::End).unwrap();
        app.insert_image(&png(), Placement::End).unwrap();
        let body = app.draft().unwrap().body.text().to_string();
        assert_eq!(body.matches("![chart.png]").count(), 2);
    }

    #[test]
    fn image_without_editor_is_rejected() {
        let mut app = app();
        assert!(matches!(
            app.insert_image(&png(), Placement::End),
            Err(BlogError::Ingest(IngestError::NoDraft))
        ));
    }

    #[test]
    fn toolbar_formats_selection() {
        let mut app = app();
        app.new_post();
        app.set_body_input("calm".to_string(), (0, 4));
        app.format_body(Format::Italic).unwrap();
        let draft = app.draft().unwrap();
        assert_eq!(draft.body.text(), "*calm*");
        assert_eq!(draft.body.selection(), Selection::cursor(6));
    }

    #[test]
    fn recent_posts_and_stats() {
        let mut app = app();
        assert_eq!(app.recent_posts().len(), 3);
        for _ in 0..4 {
            app.new_post();
            app.save_post();
        }
        assert_eq!(app.recent_posts().len(), 5);
        assert_eq!(app.recent_posts()[0].id, 7);
        assert_eq!(app.stats().posts, 7);
    }

    impl BlogApp {
        fn add_category_named(&mut self, name: &str) {
            self.set_new_category_input(name.to_string());
            self.add_category().unwrap();
        }
    }
}
