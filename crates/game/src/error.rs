use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no free entities ({max} in use)")]
    EntityTableFull { max: usize },
}
