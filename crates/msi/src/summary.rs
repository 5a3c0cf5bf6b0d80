//! The summary-information stream.

use uuid::Uuid;

use crate::PackageKind;

/// The package's `\u{5}SummaryInformation` stream.
///
/// Property-set parsing is a collaborator concern; this type surfaces
/// the raw bytes together with the container's root class-ID, which is
/// what distinguishes installers, patches and transforms.
#[derive(Debug, Clone)]
pub struct Summary {
    class_id: Uuid,
    kind: PackageKind,
    bytes: Vec<u8>,
}

impl Summary {
    pub(crate) fn new(class_id: Uuid, kind: PackageKind, bytes: Vec<u8>) -> Summary {
        Summary {
            class_id,
            kind,
            bytes,
        }
    }

    /// Root-storage class identifier of the container.
    pub fn class_id(&self) -> Uuid {
        self.class_id
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Raw property-set bytes, unparsed.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
