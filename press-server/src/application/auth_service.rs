use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{info, warn};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, Role, User};
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService {
    repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { repo, jwt }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;
        self.ensure_unique(&req).await?;

        let password_hash = self.hash_password(&req.password)?;
        let new_user = Self::into_new_user(req, password_hash, Role::User);
        let user = self.repo.create_user(new_user).await?;
        info!(user_id = user.id, "user registered");

        self.issue(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_email(&req.email).await? {
            Some(user_creds) => user_creds,
            None => {
                // одинаковое время ответа для неизвестного email и неверного пароля
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                warn!("login attempt for unknown email");
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;
        self.issue(user_creds.user)
    }

    /// Creates the configured admin account, or promotes it if the email is already registered.
    pub(crate) async fn ensure_admin(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        if let Some(existing) = self.repo.find_by_email(&req.email).await? {
            if existing.user.role == Role::Admin {
                return Ok(existing.user);
            }
            let promoted = self
                .repo
                .set_role(existing.user.id, Role::Admin)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("user id: {}", existing.user.id)))?;
            info!(user_id = promoted.id, "existing user promoted to admin");
            return Ok(promoted);
        }

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(Self::into_new_user(req, password_hash, Role::Admin))
            .await?;
        info!(user_id = user.id, "admin account created");
        Ok(user)
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    async fn ensure_unique(&self, req: &RegisterRequest) -> Result<(), DomainError> {
        let email_taken = self.repo.find_by_email(&req.email).await?.is_some();
        let username_taken = self.repo.find_by_username(&req.username).await?.is_some();
        if email_taken || username_taken {
            return Err(DomainError::AlreadyExists(
                "user with this email or username".to_string(),
            ));
        }
        Ok(())
    }

    fn issue(&self, user: User) -> Result<AuthResult, DomainError> {
        let access_token = self
            .jwt
            .generate_token(&user)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult { user, access_token })
    }

    fn into_new_user(req: RegisterRequest, password_hash: String, role: Role) -> NewUser {
        NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            role,
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::AuthService;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest, Role, User, UserSummary};
    use crate::infrastructure::jwt::JwtService;

    #[derive(Clone)]
    struct FakeUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
        login_credentials: Arc<Mutex<Option<UserCredentials>>>,
        existing_username: Arc<Mutex<Option<User>>>,
        role_updates: Arc<Mutex<Vec<(i64, Role)>>>,
        create_user_out: User,
    }

    impl FakeUserRepo {
        fn new(create_user_out: User) -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                login_credentials: Arc::new(Mutex::new(None)),
                existing_username: Arc::new(Mutex::new(None)),
                role_updates: Arc::new(Mutex::new(Vec::new())),
                create_user_out,
            }
        }

        fn set_login_credentials(&self, creds: Option<UserCredentials>) {
            *self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned") = creds;
        }

        fn take_created_input(&self) -> Option<NewUser> {
            self.created_input
                .lock()
                .expect("created input mutex poisoned")
                .take()
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            let mut out = self.create_user_out.clone();
            out.role = input.role;
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(out)
        }

        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, DomainError> {
            Ok(self
                .existing_username
                .lock()
                .expect("existing username mutex poisoned")
                .clone())
        }

        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone())
        }

        async fn set_role(&self, user_id: i64, role: Role) -> Result<Option<User>, DomainError> {
            self.role_updates
                .lock()
                .expect("role updates mutex poisoned")
                .push((user_id, role));
            let mut user = self.create_user_out.clone();
            user.id = user_id;
            user.role = role;
            Ok(Some(user))
        }

        async fn find_summaries(&self, _ids: &[i64]) -> Result<Vec<UserSummary>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_returns_token() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let jwt = test_jwt();
        let service = AuthService::new(Arc::new(repo.clone()), jwt.clone());

        let req = RegisterRequest {
            username: "  valid_user  ".to_string(),
            email: "  VALID@EXAMPLE.COM  ".to_string(),
            password: "very-secure-password".to_string(),
        };

        let result = service.register(req).await.expect("register must succeed");

        assert_eq!(result.user.username, "valid_user");
        assert_eq!(result.user.role, Role::User);
        let claims = jwt
            .verify_token(&result.access_token)
            .expect("issued token must verify");
        assert_eq!(claims.user_id, 1);

        let created = repo
            .take_created_input()
            .expect("create_user must be called");
        assert_eq!(created.username, "valid_user");
        assert_eq!(created.email, "valid@example.com");
        assert_eq!(created.role, Role::User);
        assert_ne!(created.password_hash, "very-secure-password");
        assert!(created.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(5, "someone", "valid@example.com"),
            password_hash: "irrelevant".to_string(),
        }));
        let service = AuthService::new(Arc::new(repo.clone()), test_jwt());

        let req = RegisterRequest {
            username: "valid_user".to_string(),
            email: "valid@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };

        let err = service.register(req).await.expect_err("register must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert!(repo.take_created_input().is_none());
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        *repo
            .existing_username
            .lock()
            .expect("existing username mutex poisoned") =
            Some(sample_user(5, "valid_user", "other@example.com"));
        let service = AuthService::new(Arc::new(repo), test_jwt());

        let req = RegisterRequest {
            username: "valid_user".to_string(),
            email: "valid@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };

        let err = service.register(req).await.expect_err("register must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        repo.set_login_credentials(None);
        let service = AuthService::new(Arc::new(repo), test_jwt());

        let req = LoginRequest {
            email: "valid@example.com".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(Arc::new(repo.clone()), test_jwt());

        let hash = service
            .hash_password("correct-password")
            .expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "valid_user", "valid@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            email: "valid@example.com".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let jwt = test_jwt();
        let service = AuthService::new(Arc::new(repo.clone()), jwt.clone());

        let hash = service
            .hash_password("correct-password")
            .expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "valid_user", "valid@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            email: "VALID@example.com".to_string(),
            password: "correct-password".to_string(),
        };

        let result = service.login(req).await.expect("login must succeed");
        assert_eq!(result.user.id, 1);
        let claims = jwt
            .verify_token(&result.access_token)
            .expect("issued token must verify");
        assert_eq!(claims.user_id, result.user.id);
    }

    #[tokio::test]
    async fn ensure_admin_promotes_existing_user() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(9, "boss", "boss@example.com"),
            password_hash: "irrelevant".to_string(),
        }));
        let service = AuthService::new(Arc::new(repo.clone()), test_jwt());

        let req = RegisterRequest {
            username: "boss".to_string(),
            email: "boss@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };

        let admin = service.ensure_admin(req).await.expect("must succeed");
        assert_eq!(admin.id, 9);
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(
            *repo.role_updates.lock().expect("role updates mutex poisoned"),
            vec![(9, Role::Admin)]
        );
        assert!(repo.take_created_input().is_none());
    }

    #[tokio::test]
    async fn ensure_admin_creates_missing_account() {
        let repo = FakeUserRepo::new(sample_user(1, "boss", "boss@example.com"));
        let service = AuthService::new(Arc::new(repo.clone()), test_jwt());

        let req = RegisterRequest {
            username: "boss".to_string(),
            email: "boss@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };

        let admin = service.ensure_admin(req).await.expect("must succeed");
        assert_eq!(admin.role, Role::Admin);
        let created = repo
            .take_created_input()
            .expect("create_user must be called");
        assert_eq!(created.role, Role::Admin);
    }

    fn sample_user(id: i64, username: &str, email: &str) -> User {
        User::new(
            id,
            username.to_string(),
            email.to_string(),
            Role::User,
            Utc::now(),
        )
        .expect("sample user must be valid")
    }

    fn test_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600))
    }
}
