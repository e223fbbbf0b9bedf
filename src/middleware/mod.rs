/// HTTP middleware
///
/// - `method_override`: lets plain HTML forms drive PATCH and DELETE routes
pub mod method_override;
