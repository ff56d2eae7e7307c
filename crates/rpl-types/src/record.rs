use serde::{Deserialize, Serialize};

use crate::entity::{Ad, ApplicationForRide, Car, CarpoolRide, DocType, Entity, User};
use crate::error::TypeError;
use crate::key::EntityKey;

/// Every kind of record that can live in the shared namespace.
///
/// Encoded as a JSON object whose `docType` field carries the [`DocType`]
/// discriminator alongside the entity's own fields:
///
/// ```json
/// {"docType":"car","licencePlate":"BE-1","availableSeats":3,...}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "docType", rename_all = "camelCase")]
pub enum Record {
    User(User),
    Ad(Ad),
    Car(Car),
    CarpoolRide(CarpoolRide),
    ApplicationForRide(ApplicationForRide),
}

impl Record {
    /// The discriminator of this record.
    pub fn doc_type(&self) -> DocType {
        match self {
            Self::User(_) => DocType::User,
            Self::Ad(_) => DocType::Ad,
            Self::Car(_) => DocType::Car,
            Self::CarpoolRide(_) => DocType::CarpoolRide,
            Self::ApplicationForRide(_) => DocType::ApplicationForRide,
        }
    }

    /// Key under which the wrapped entity is stored.
    pub fn key(&self) -> Result<EntityKey, TypeError> {
        match self {
            Self::User(e) => e.key(),
            Self::Ad(e) => e.key(),
            Self::Car(e) => e.key(),
            Self::CarpoolRide(e) => e.key(),
            Self::ApplicationForRide(e) => e.key(),
        }
    }

    /// Encode to the stored byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode from the stored byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::MalformedRecord(e.to_string()))
    }

    /// Read only the discriminator, without decoding the entity fields.
    pub fn peek_doc_type(bytes: &[u8]) -> Result<DocType, TypeError> {
        #[derive(Deserialize)]
        struct Tag {
            #[serde(rename = "docType")]
            doc_type: DocType,
        }
        serde_json::from_slice::<Tag>(bytes)
            .map(|tag| tag.doc_type)
            .map_err(|e| TypeError::MalformedRecord(e.to_string()))
    }
}
