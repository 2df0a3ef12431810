pub(crate) mod category;
pub(crate) mod error;
pub(crate) mod policy;
pub(crate) mod post;
pub(crate) mod slug;
pub(crate) mod user;
