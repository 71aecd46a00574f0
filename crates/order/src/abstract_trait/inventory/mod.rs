use crate::model::variant::Variant as VariantModel;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use uuid::Uuid;

/// Per-variant stock counts.
///
/// Implemented by a transaction handle: every call runs inside the enclosing
/// transaction and becomes durable only when that transaction commits.
#[async_trait]
pub trait InventoryLedgerTrait: Send {
    /// `None` when the variant does not exist.
    async fn get_current_stock(&mut self, variant_id: Uuid) -> Result<Option<i32>, RepositoryError>;

    /// Reads the variant and locks it until the transaction ends.
    async fn find_variant_for_update(
        &mut self,
        variant_id: Uuid,
    ) -> Result<Option<VariantModel>, RepositoryError>;

    /// Removes `amount` units if at least that many remain, returning the new
    /// stock. `None` means nothing was changed: the variant is missing or the
    /// stock would go negative.
    async fn decrement_stock(
        &mut self,
        variant_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, RepositoryError>;

    /// Adds `amount` units unconditionally. `None` when the variant no longer exists.
    async fn increment_stock(
        &mut self,
        variant_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, RepositoryError>;
}
