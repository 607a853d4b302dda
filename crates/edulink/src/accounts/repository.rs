use super::domain::User;
use crate::ids::UserId;
use crate::store::RepositoryError;

/// Storage abstraction for accounts.
///
/// `insert` must reject a username or e-mail that is already taken (compared
/// case-insensitively) with [`RepositoryError::Conflict`].
pub trait AccountRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    /// Look up by username or e-mail, case-insensitively.
    fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;
    /// Report whether the username and e-mail are already in use.
    fn taken(&self, username: &str, email: &str) -> Result<(bool, bool), RepositoryError>;
    fn list(&self) -> Result<Vec<User>, RepositoryError>;
}
