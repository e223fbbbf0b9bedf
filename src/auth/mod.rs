/// Authentication
///
/// - `password`: Argon2id password hashing and verification
/// - `session`: signed session tokens carried in an HTTP-only cookie
/// - `middleware`: login gate for routes that require a signed-in user
pub mod middleware;
pub mod password;
pub mod session;
