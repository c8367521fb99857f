use std::fs;

use crate::error::UpdateError;
use crate::paths::Paths;
use crate::update::interpreter::Interpreter;

/// Bootstrap body of the POSIX launcher. It locates `lib/` relative to its
/// own real path, derives the version-qualified vendor directory from the
/// interpreter actually running it, and only then enters the tool.
const LAUNCHER_BODY: &str = r#"# -*- coding: utf-8 -*-
import os
import sys

lib = os.path.normpath(os.path.join(os.path.realpath(__file__), "../..", "lib"))
vendors = os.path.join(lib, "quill", "_vendor")
current_vendors = os.path.join(
    vendors, "py{}".format(".".join(str(v) for v in sys.version_info[:2]))
)
sys.path.insert(0, lib)
sys.path.insert(0, current_vendors)

if __name__ == "__main__":
    from quill.console import main
    main()
"#;

/// (Re)generate the launchers in `bin/`.
///
/// Output is deterministic for a given interpreter, so regeneration after
/// every update is idempotent. The executable bit is set explicitly after
/// writing; text writes do not preserve it.
pub fn write_launchers(paths: &Paths, interpreter: &Interpreter) -> Result<(), UpdateError> {
    let bin = paths.bin();
    fs::create_dir_all(&bin).map_err(|e| UpdateError::filesystem(&bin, e))?;

    let launcher = paths.launcher();
    fs::write(&launcher, posix_launcher(interpreter))
        .map_err(|e| UpdateError::filesystem(&launcher, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755))
            .map_err(|e| UpdateError::filesystem(&launcher, e))?;
    }

    #[cfg(windows)]
    {
        let batch = bin.join("quill.bat");
        let profile = std::env::var("USERPROFILE").ok();
        let content = batch_launcher(
            interpreter,
            &launcher.display().to_string(),
            profile.as_deref(),
        );
        fs::write(&batch, content).map_err(|e| UpdateError::filesystem(&batch, e))?;
    }

    Ok(())
}

fn posix_launcher(interpreter: &Interpreter) -> String {
    format!("#!/usr/bin/env {}\n{}", interpreter.command_line(), LAUNCHER_BODY)
}

/// Command-shell launcher invoking the bootstrap script by absolute path.
///
/// The user profile prefix is replaced with `%USERPROFILE%` so the file
/// stays valid when copied between profiles on the same machine.
fn batch_launcher(
    interpreter: &Interpreter,
    launcher_path: &str,
    user_profile: Option<&str>,
) -> String {
    let mut target = launcher_path.to_string();
    if let Some(profile) = user_profile {
        if let Some(rest) = target.strip_prefix(profile) {
            target = format!("%USERPROFILE%{}", rest);
        }
    }

    format!(
        "@echo off\r\n{} \"{}\" %*\r\n",
        interpreter.command_line(),
        target
    )
}
