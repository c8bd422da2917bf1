#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store error")]
    Database(sqlx::Error),
}
