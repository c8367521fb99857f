use std::process::Command;

/// Name embedded in launchers when no candidate responds; keeps previously
/// generated scripts working on hosts we cannot probe.
const DEFAULT_INTERPRETER: &str = "python";

/// The interpreter invocation embedded in generated launchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    command: Vec<String>,
}

impl Interpreter {
    fn new(command: &[&str]) -> Self {
        Interpreter {
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The full invocation as a single command line, e.g. `py -3`.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Probe the host for the interpreter to embed in launchers.
///
/// Candidates are tried in order with a `--version` argument; the first one
/// reporting major version 3 or newer wins immediately, otherwise the first
/// one that reported any parsable version is kept as a fallback. Probe
/// failures (missing executable, non-zero exit, unparsable output) never
/// abort the scan, and this function never fails: with no usable candidate
/// it returns the fixed default.
pub fn resolve() -> Interpreter {
    resolve_with(candidates(), probe)
}

fn candidates() -> Vec<Vec<&'static str>> {
    let mut candidates = vec![vec!["python"], vec!["python3"]];

    if cfg!(windows) {
        candidates.push(vec!["py", "-3"]);
        candidates.push(vec!["py", "-2"]);
    }

    candidates
}

fn resolve_with<F>(candidates: Vec<Vec<&'static str>>, mut probe: F) -> Interpreter
where
    F: FnMut(&[&str]) -> Option<String>,
{
    let mut fallback = None;

    for candidate in &candidates {
        let Some(reported) = probe(candidate) else {
            continue;
        };

        let Some((major, _minor)) = parse_reported_version(&reported) else {
            continue;
        };

        if major >= 3 {
            return Interpreter::new(candidate);
        }

        if fallback.is_none() {
            fallback = Some(Interpreter::new(candidate));
        }
    }

    fallback.unwrap_or_else(|| Interpreter::new(&[DEFAULT_INTERPRETER]))
}

/// Run a candidate with `--version`, returning its combined output.
///
/// Argument-vector invocation only; candidate parts are never joined into a
/// shell string. Older interpreters print the version banner on stderr, so
/// both streams are captured.
fn probe(candidate: &[&str]) -> Option<String> {
    let output = Command::new(candidate[0])
        .args(&candidate[1..])
        .arg("--version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Some(combined)
}

/// Parse a `Python <major>.<minor>.<rest>` version banner.
///
/// Only major and minor are numeric; the third component must be present
/// but is otherwise unconstrained (it can carry local suffixes).
fn parse_reported_version(raw: &str) -> Option<(u64, u64)> {
    let rest = raw.trim().strip_prefix("Python ")?;
    let mut parts = rest.splitn(3, '.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = parts.next()?.parse().ok()?;
    let patch = parts.next()?;
    if patch.is_empty() {
        return None;
    }

    Some((major, minor))
}
