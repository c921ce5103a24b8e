//! Type-safe identifier wrappers.
//!
//! Participants are identified by an opaque [`Uuid`] handed to the core by
//! the identity collaborator. Every other entity gets a serial `u64` minted
//! from a monotonically increasing counter held by the ledger, so two
//! entities of the same kind never share an identifier even after one of
//! them has been removed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generates a newtype wrapper around a serial `u64` minted by the ledger.
macro_rules! define_serial_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Return the raw serial number.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id! {
    /// Opaque identifier for a participant, carried in the signed client token.
    ParticipantId
}

define_serial_id! {
    /// Identifier for a contract.
    ContractId
}

define_serial_id! {
    /// Identifier for a loan between two participants.
    LoanId
}

define_serial_id! {
    /// Identifier for an obligation (an IOU recorded by a creditor).
    ObligationId
}

define_serial_id! {
    /// Identifier for a rumor.
    RumorId
}

define_serial_id! {
    /// Identifier for a piece of evidence.
    EvidenceId
}

define_serial_id! {
    /// Identifier for a scry report.
    ScryId
}

define_serial_id! {
    /// Identifier for a message intercept.
    InterceptId
}

define_serial_id! {
    /// Identifier for a civic project.
    ProjectId
}

define_serial_id! {
    /// Identifier for a crisis.
    CrisisId
}

define_serial_id! {
    /// Identifier for a narrative event log entry.
    EventId
}

define_serial_id! {
    /// Identifier for a chat line.
    ChatId
}

define_serial_id! {
    /// Identifier for a diplomatic message.
    MessageId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_ids_are_unique() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn serial_id_display_has_hash_prefix() {
        assert_eq!(ContractId(42).to_string(), "#42");
        assert_eq!(LoanId::from(7).get(), 7);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = ParticipantId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<ParticipantId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }
}
