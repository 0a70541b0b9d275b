//! Clone URL handling.

/// Rewrite a GitHub clone URL so it connects through the SSH host alias.
///
/// HTTPS, `git@github.com:` and `git://` URLs are turned into
/// `git@<ssh_host>:<owner>/<repo>`; anything else (including URLs that already
/// use an alias) is returned unchanged.
pub fn rewrite_git_url(url: &str, ssh_host: &str) -> String {
    const PREFIXES: [&str; 3] = ["https://github.com/", "git@github.com:", "git://github.com/"];

    PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))
        .map(|repo| format!("git@{ssh_host}:{repo}"))
        .unwrap_or_else(|| url.to_string())
}

/// Directory `git clone <url>` creates when no destination is given
pub fn repo_dir_name(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_https() {
        assert_eq!(
            rewrite_git_url("https://github.com/acme/widget", "github.com-work"),
            "git@github.com-work:acme/widget"
        );
    }

    #[test]
    fn test_rewrite_ssh() {
        assert_eq!(
            rewrite_git_url("git@github.com:acme/widget.git", "github.com-work"),
            "git@github.com-work:acme/widget.git"
        );
    }

    #[test]
    fn test_rewrite_git_protocol() {
        assert_eq!(
            rewrite_git_url("git://github.com/acme/widget.git", "github.com-work"),
            "git@github.com-work:acme/widget.git"
        );
    }

    #[test]
    fn test_already_aliased_unchanged() {
        let url = "git@github.com-personal:acme/widget.git";
        assert_eq!(rewrite_git_url(url, "github.com-work"), url);
        assert_eq!(
            rewrite_git_url("https://gitlab.com/acme/widget", "github.com-work"),
            "https://gitlab.com/acme/widget"
        );
    }

    #[test]
    fn test_repo_dir_name() {
        assert_eq!(repo_dir_name("https://github.com/acme/widget").as_deref(), Some("widget"));
        assert_eq!(repo_dir_name("git@github.com:acme/widget.git").as_deref(), Some("widget"));
        assert_eq!(repo_dir_name("git@github.com:widget.git").as_deref(), Some("widget"));
        assert_eq!(repo_dir_name("https://github.com/acme/widget/").as_deref(), Some("widget"));
        assert_eq!(repo_dir_name(""), None);
    }
}
