//! Boundary validation helpers shared by the account, engagement, and
//! newsletter services.

/// Minimal structural check: one `@` with non-empty local part and a domain
/// that contains a dot. Full RFC validation is the mail provider's problem.
pub fn email_is_valid(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !domain.contains('@')
}
