//! Pre/post save dispatch: an explicit, ordered list of synchronous
//! receivers. Pre-save receivers can veto the whole operation by
//! returning `Flow::Abort`.

use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::middleware::RequestContext;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Proceed,
    Abort,
}

impl Flow {
    pub fn aborted(self) -> bool {
        self == Flow::Abort
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkAction {
    Add,
    Remove,
}

/// What is about to happen, handed to pre-save receivers.
#[derive(Debug)]
pub struct BookmarkEvent<'a> {
    pub action: BookmarkAction,
    pub user_id: i64,
    pub target: &'a ContentRef,
    pub key: &'a str,
}

/// What just happened, handed to post-save receivers. `created` is false
/// when the toggle removed an existing bookmark.
#[derive(Debug)]
pub struct SavedEvent<'a> {
    pub bookmark: &'a Bookmark,
    pub created: bool,
}

pub type PreSaveReceiver = Box<dyn Fn(&RequestContext, &BookmarkEvent) -> Flow + Send + Sync>;
pub type PostSaveReceiver = Box<dyn Fn(&RequestContext, &SavedEvent) + Send + Sync>;

#[derive(Default)]
pub struct SignalHub {
    pre_save: RwLock<Vec<PreSaveReceiver>>,
    post_save: RwLock<Vec<PostSaveReceiver>>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_pre_save(&self, receiver: PreSaveReceiver) {
        self.pre_save
            .write()
            .expect("signal hub lock poisoned")
            .push(receiver);
    }

    pub fn connect_post_save(&self, receiver: PostSaveReceiver) {
        self.post_save
            .write()
            .expect("signal hub lock poisoned")
            .push(receiver);
    }

    /// Invoke every pre-save receiver in connection order. All receivers
    /// run even after a veto; a single `Abort` aborts the operation.
    pub fn send_pre_save(&self, ctx: &RequestContext, event: &BookmarkEvent) -> Flow {
        let receivers = self.pre_save.read().expect("signal hub lock poisoned");
        let mut flow = Flow::Proceed;
        for receiver in receivers.iter() {
            if receiver(ctx, event).aborted() {
                flow = Flow::Abort;
            }
        }
        flow
    }

    pub fn send_post_save(&self, ctx: &RequestContext, event: &SavedEvent) {
        let receivers = self.post_save.read().expect("signal hub lock poisoned");
        for receiver in receivers.iter() {
            receiver(ctx, event);
        }
    }
}
