//! Enveloppe de réponse REST et taxonomie des erreurs du backend
//!
//! Toutes les réponses suivent `{ success, data?, message?, count?, error? }` ;
//! les membres absents ne sont pas sérialisés.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Préfixe du header `Authorization`
pub const BEARER_PREFIX: &str = "Bearer ";

/// Rôle requis pour les opérations d'administration
pub const ADMIN_ROLE: &str = "admin";

/// Enveloppe de réponse uniforme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Échec : `message` pour l'utilisateur, `error` pour le détail technique
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            count: None,
            error,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Liste avec son nombre d'éléments
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::ok(items)
        }
    }
}

/// Statuts HTTP utilisés par le backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiStatus {
    Ok,
    Created,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalError,
}

impl ApiStatus {
    pub fn code(self) -> u16 {
        match self {
            ApiStatus::Ok => 200,
            ApiStatus::Created => 201,
            ApiStatus::BadRequest => 400,
            ApiStatus::Unauthorized => 401,
            ApiStatus::Forbidden => 403,
            ApiStatus::NotFound => 404,
            ApiStatus::Conflict => 409,
            ApiStatus::InternalError => 500,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            200 => ApiStatus::Ok,
            201 => ApiStatus::Created,
            400 => ApiStatus::BadRequest,
            401 => ApiStatus::Unauthorized,
            403 => ApiStatus::Forbidden,
            404 => ApiStatus::NotFound,
            409 => ApiStatus::Conflict,
            500 => ApiStatus::InternalError,
            _ => return None,
        })
    }

    pub fn is_success(self) -> bool {
        matches!(self, ApiStatus::Ok | ApiStatus::Created)
    }
}

/// Erreurs du backend, avec message localisé
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Token de autenticação não fornecido")]
    MissingToken,

    #[error("Token inválido ou expirado")]
    InvalidToken,

    #[error("Acesso negado. Apenas administradores podem realizar esta operação.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Erreur inattendue ; `detail` est renvoyé dans le membre `error`
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> ApiStatus {
        match self {
            ApiError::Validation(_) => ApiStatus::BadRequest,
            ApiError::MissingToken | ApiError::InvalidToken => ApiStatus::Unauthorized,
            ApiError::Forbidden => ApiStatus::Forbidden,
            ApiError::NotFound(_) => ApiStatus::NotFound,
            ApiError::Conflict(_) => ApiStatus::Conflict,
            ApiError::Internal { .. } => ApiStatus::InternalError,
        }
    }

    /// Statut et enveloppe d'échec ; les erreurs internes sont journalisées
    pub fn to_envelope<T>(&self) -> (ApiStatus, Envelope<T>) {
        let detail = match self {
            ApiError::Internal { message, detail } => {
                error!(message = %message, detail = %detail, "Internal backend error");
                Some(detail.clone())
            }
            _ => None,
        };
        (self.status(), Envelope::failure(self.to_string(), detail))
    }
}

/// Extrait le jeton d'un header `Authorization: Bearer <token>`
pub fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let token = header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::MissingToken)?;
    if token.trim().is_empty() {
        return Err(ApiError::InvalidToken);
    }
    Ok(token)
}

/// Session authentifiée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    /// Opérations de mutation réservées au rôle `admin`
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
