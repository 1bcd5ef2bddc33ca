use crate::draft::EditorTarget;
use crate::model::PostId;

/// Screen currently shown below the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Post(PostId),
    Editor(EditorTarget),
    Admin,
    Categories,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    GoHome,
    OpenPost(PostId),
    EditPost(PostId),
    NewPost,
    OpenAdmin,
    OpenCategories,
    ShowLogin,
    HideLogin,
    Logout,
    PostDeleted(PostId),
    CancelEditor,
    SavedPost,
}

/// The view state machine. The login overlay hides whatever view is current
/// until it is dismissed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Router {
    view: View,
    login_open: bool,
}

impl Router {
    pub fn view(&self) -> View {
        self.view
    }

    pub fn login_open(&self) -> bool {
        self.login_open
    }

    pub fn apply(&mut self, action: NavAction) {
        let next = transition(*self, action);
        if next != *self {
            log::debug!("navigate {:?} -> {:?} via {:?}", self, next, action);
        }
        *self = next;
    }
}

fn transition(router: Router, action: NavAction) -> Router {
    let view = match action {
        NavAction::GoHome | NavAction::Logout | NavAction::CancelEditor | NavAction::SavedPost => {
            View::Home
        }
        NavAction::OpenPost(id) => View::Post(id),
        NavAction::EditPost(id) => View::Editor(EditorTarget::Existing(id)),
        NavAction::NewPost => View::Editor(EditorTarget::New),
        NavAction::OpenAdmin => View::Admin,
        NavAction::OpenCategories => View::Categories,
        NavAction::PostDeleted(id) if router.view == View::Post(id) => View::Home,
        NavAction::PostDeleted(_) | NavAction::ShowLogin | NavAction::HideLogin => router.view,
    };
    let login_open = match action {
        NavAction::ShowLogin => true,
        NavAction::HideLogin => false,
        _ => router.login_open,
    };
    Router { view, login_open }
}
