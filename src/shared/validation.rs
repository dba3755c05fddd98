use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating usernames
    /// Letters, digits and `@ . + - _` only
    /// - Valid: "john_doe", "user.name", "me+files@home", "123"
    /// - Invalid: "user name", "user/name", "üser!", ""
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9@.+_-]+$").unwrap();
}
