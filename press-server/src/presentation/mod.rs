use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::category_service::CategoryService;
use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) category_service: Arc<CategoryService>,
    pub(crate) blog_service: Arc<BlogService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        posts: Arc<dyn PostRepository>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            category_service: Arc::new(CategoryService::new(categories.clone())),
            blog_service: Arc::new(BlogService::new(posts, categories, users)),
            jwt,
        }
    }
}
