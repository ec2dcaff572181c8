use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{info, instrument};

use super::password::PasswordScheme;
use crate::{
    db::UserStore,
    error::{AppError, Result},
    models::{ActingUser, AuthResponse, Claims, User},
};

/// Verifies credentials and issues/reads session tokens.
pub struct AuthService {
    users: UserStore,
    jwt_secret: String,
    expiration_hours: i64,
}

impl AuthService {
    pub fn new(users: UserStore, jwt_secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            users,
            jwt_secret: jwt_secret.into(),
            expiration_hours,
        }
    }

    /// The user owning `login` if `password` matches, `None` otherwise.
    /// Blank credentials never reach the store.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<Option<User>> {
        let login = login.trim();
        if login.is_empty() || password.trim().is_empty() {
            return Ok(None);
        }

        let user = self.users.find_by_login(login).await?;
        Ok(user
            .filter(|user| PasswordScheme::verify(&user.password, password))
            .inspect(|_| info!("User authenticated: {}", login)))
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<AuthResponse> {
        match self.authenticate(login, password).await? {
            Some(user) => {
                let token = self.issue_token(&user)?;
                Ok(AuthResponse::success(&user, token))
            }
            None => Ok(AuthResponse::failure()),
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let sub = user
            .id
            .ok_or_else(|| AppError::Internal("cannot issue a token for an unsaved user".into()))?;

        let claims = Claims {
            sub,
            login: user.login.clone(),
            role: user.role_name().map(str::to_string),
            exp: (Utc::now() + Duration::hours(self.expiration_hours)).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<ActingUser> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Auth(format!("Invalid session: {e}")))?;

        Ok(ActingUser::from(data.claims))
    }
}
