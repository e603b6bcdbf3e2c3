// app/src/models/ids.rs

//! Newtype identifiers so a `ProductId` can never be passed where an `OrderId`
//! is expected.

macro_rules! define_id {
  ($name:ident) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize, sqlx::Type)]
    #[serde(transparent)]
    #[sqlx(transparent)]
    pub struct $name(uuid::Uuid);

    impl $name {
      pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
      }

      pub const fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
      }

      pub const fn as_uuid(&self) -> uuid::Uuid {
        self.0
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self::new()
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
      }
    }

    impl std::str::FromStr for $name {
      type Err = uuid::Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
      }
    }

    impl From<uuid::Uuid> for $name {
      fn from(id: uuid::Uuid) -> Self {
        Self(id)
      }
    }
  };
}

define_id!(ProductId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(UserId);
