// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{EntityKind, ProductId, RecordId};

/// A required field is missing or does not parse. Raised before any network
/// call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("le champ {field} est requis")]
    Required { field: &'static str },
    #[error("valeur invalide pour {field}: {value:?}")]
    Unparseable { field: &'static str, value: String },
    #[error("Numéro de page invalide ({requested} hors de 1..={max_page})")]
    InvalidPage { requested: usize, max_page: usize },
    #[error("Veuillez sélectionner un produit pour chaque ligne (ligne {line})")]
    MissingProduct { line: usize },
    #[error("la quantité doit être au moins 1 (ligne {line})")]
    InvalidQuantity { line: usize },
    #[error("la facture doit contenir au moins un produit")]
    EmptyInvoice,
    #[error("aucune modification en cours pour cet élément")]
    NotEditing,
}

/// The request failed in transport or the server answered non-2xx.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("serveur injoignable ({url}): {message}")]
    Transport { url: String, message: String },
    #[error("erreur serveur ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("réponse illisible: {message}")]
    Decode { message: String },
}

impl NetworkError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

/// A reference into another collection does not resolve in the loaded data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("produit #{product_id} introuvable dans le catalogue")]
    UnknownProduct { product_id: ProductId },
    #[error("{kind} {record_id} introuvable dans la liste chargée")]
    UnknownRecord { kind: EntityKind, record_id: RecordId },
    #[error("ligne {line} inexistante")]
    UnknownLine { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

impl UiError {
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
