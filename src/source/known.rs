/// Hosting services whose file URLs we know how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    GitHub,
    GitLab,
    Bitbucket,
    /// `*.googlesource.com` gitiles.
    GoogleSource,
    /// Code search for `golang.org/x` repositories.
    OpenSourceGoogle,
    SourceHut,
}

impl HostKind {
    pub fn file_url(self, repo_url: &str, commit: &str, file: &str) -> String {
        match self {
            HostKind::GitHub => format!("{repo_url}/blob/{commit}/{file}"),
            HostKind::GitLab => format!("{repo_url}/-/blob/{commit}/{file}"),
            HostKind::Bitbucket => format!("{repo_url}/src/{commit}/{file}"),
            HostKind::GoogleSource => format!("{repo_url}/+/{commit}/{file}"),
            HostKind::OpenSourceGoogle => format!("{repo_url}/+/{commit}:{file}"),
            HostKind::SourceHut => format!("{repo_url}/tree/{commit}/item/{file}"),
        }
    }
}

/// A repository recognised from an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMatch {
    /// Leading part of the import path that names the repository root.
    pub root: String,
    pub repo_url: String,
    pub kind: HostKind,
}

/// Recognise the repository of `import_path` without touching the network.
pub fn match_repo(import_path: &str) -> Option<RepoMatch> {
    let segments: Vec<&str> = import_path.split('/').collect();
    let non_empty = |n: usize| segments.len() >= n && segments[..n].iter().all(|s| !s.is_empty());

    let (root_len, repo_url, kind) = match segments[0] {
        "github.com" | "gitlab.com" | "bitbucket.org" if non_empty(3) => {
            let kind = match segments[0] {
                "github.com" => HostKind::GitHub,
                "gitlab.com" => HostKind::GitLab,
                _ => HostKind::Bitbucket,
            };
            (3, format!("https://{}", segments[..3].join("/")), kind)
        }
        "golang.org" if non_empty(3) && segments[1] == "x" => (
            3,
            format!("https://cs.opensource.google/go/x/{}", segments[2]),
            HostKind::OpenSourceGoogle,
        ),
        host if host.ends_with(".googlesource.com") && non_empty(2) => (
            2,
            format!("https://{}/{}", host, segments[1]),
            HostKind::GoogleSource,
        ),
        "git.sr.ht" if non_empty(3) && segments[1].starts_with('~') => (
            3,
            format!("https://{}", segments[..3].join("/")),
            HostKind::SourceHut,
        ),
        "gopkg.in" => return match_gopkg_in(&segments),
        _ => return None,
    };

    Some(RepoMatch {
        root: segments[..root_len].join("/"),
        repo_url,
        kind,
    })
}

/// `gopkg.in/pkg.vN` lives at `github.com/go-pkg/pkg`,
/// `gopkg.in/user/pkg.vN` at `github.com/user/pkg`.
fn match_gopkg_in(segments: &[&str]) -> Option<RepoMatch> {
    fn versioned(segment: &str) -> Option<String> {
        let (name, major) = segment.rsplit_once(".v")?;
        (!name.is_empty() && !major.is_empty() && major.chars().all(|c| c.is_ascii_digit()))
            .then(|| name.to_string())
    }

    if let Some(name) = segments.get(1).and_then(|s| versioned(s)) {
        return Some(RepoMatch {
            root: segments[..2].join("/"),
            repo_url: format!("https://github.com/go-{name}/{name}"),
            kind: HostKind::GitHub,
        });
    }
    let user = segments.get(1).filter(|u| !u.is_empty())?;
    let name = segments.get(2).and_then(|s| versioned(s))?;
    Some(RepoMatch {
        root: segments[..3].join("/"),
        repo_url: format!("https://github.com/{user}/{name}"),
        kind: HostKind::GitHub,
    })
}

/// Recognise a repository URL found in a `go-import` meta tag.
pub fn match_repo_url(url: &str) -> Option<RepoMatch> {
    let bare = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("git://")
        .trim_end_matches('/')
        .trim_end_matches(".git");
    match_repo(bare)
}
