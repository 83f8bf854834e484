use thiserror::Error;

use crate::forms::FormError;
use crate::models::OrderStatus;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("Votre panier est vide")]
    EmptyCart,

    #[error("Veuillez sélectionner une heure de passage pour fluidifier le service. Merci !")]
    MissingPickupTime,

    #[error("Le service est temporairement en pause")]
    ServicePaused,

    #[error("order {id} cannot go from {from} back to {to}")]
    InvalidTransition {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error(transparent)]
    Form(#[from] FormError),
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        AppError::LockPoisoned
    }
}
