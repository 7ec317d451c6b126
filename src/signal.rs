//! Launching detached child processes.

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Lets the kernel reap children as they exit, then collects any that
/// already did.
pub fn ignore_child_exits() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::SigIgn,
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGCHLD, &action) }?;

    while let Ok(status) = waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
        if status == WaitStatus::StillAlive {
            break;
        }
    }
    Ok(())
}

fn spawn(mut command: Command) -> Option<u32> {
    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid().map_err(std::io::Error::from)?;
            Ok(())
        });
    }

    match command.stdin(Stdio::null()).spawn() {
        Ok(child) => {
            debug!(pid = child.id(), "spawned {:?}", command.get_program());
            Some(child.id())
        }
        Err(error) => {
            warn!("failed to spawn {:?}: {error}", command.get_program());
            None
        }
    }
}

/// Runs a shell command line in its own session.
pub fn spawn_detached(command: &str) -> Option<u32> {
    let mut shell = Command::new("sh");
    shell.arg("-c").arg(command);
    spawn(shell)
}

/// Command line whose shell replaces itself with the command, so the
/// returned pid is the program's own.
pub fn exec_command_line(command: &str) -> String {
    let command = command.trim_start();
    if command.starts_with("exec ") {
        command.to_string()
    } else {
        format!("exec {command}")
    }
}

/// Runs `program` with `args` in its own session and returns its pid.
pub fn spawn_detached_with_args(program: &str, args: &[&str]) -> Option<u32> {
    let mut command = Command::new(program);
    command.args(args);
    spawn(command)
}

/// Runs the user's startup script through `/bin/sh` when it exists.
pub fn run_startup_script(path: &Path) {
    if path.is_file() {
        let mut command = Command::new("/bin/sh");
        command.arg(path);
        spawn(command);
    }
}

/// Argument vector for a launcher command, adding `-m <monitor>` for dmenu.
pub fn launcher_args(command: &[String], monitor_number: usize) -> Vec<String> {
    let mut args = command.to_vec();
    let is_dmenu = command
        .first()
        .is_some_and(|program| program.starts_with("dmenu"));
    let has_monitor_flag = command.iter().any(|arg| arg == "-m");
    if is_dmenu && !has_monitor_flag {
        args.insert(1, monitor_number.to_string());
        args.insert(1, "-m".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn dmenu_gets_the_monitor() {
        assert_eq!(
            launcher_args(&strings(&["dmenu_run", "-fn", "mono"]), 1),
            strings(&["dmenu_run", "-m", "1", "-fn", "mono"])
        );
    }

    #[test]
    fn explicit_monitor_flag_is_kept() {
        let args = strings(&["dmenu_run", "-m", "0"]);
        assert_eq!(launcher_args(&args, 2), args);
    }

    #[test]
    fn other_programs_are_untouched() {
        let args = strings(&["st", "-e", "htop"]);
        assert_eq!(launcher_args(&args, 1), args);
    }

    #[test]
    fn shell_commands_exec_the_program() {
        assert_eq!(exec_command_line("st -n scratch"), "exec st -n scratch");
        assert_eq!(exec_command_line("  exec st"), "exec st");
    }
}
