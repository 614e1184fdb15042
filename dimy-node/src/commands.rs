//! Command-script parser and cycling interpreter (spec.md §4.9), grounded on
//! `examples/original_source/client.py`'s `command_loop`/`command`
//! (`itertools.cycle` over the parsed lines).

use std::path::Path;

use crate::error::NodeError;

/// One line of a command script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Rebind the listener/broadcaster to this UDP port.
    Move(u16),
    /// Advance `wait_time` by this many seconds.
    Wait(f64),
    /// Upload a CBF immediately and stay flagged positive for this many
    /// seconds.
    Positive(u64),
    /// Halt the node cleanly.
    Stop,
}

/// A command script: the parsed lines plus a cursor that loops back to the
/// start, mirroring `itertools.cycle`.
#[derive(Debug, Clone)]
pub struct CommandScript {
    commands: Vec<Command>,
    cursor: usize,
}

impl CommandScript {
    /// Reads and parses a line-delimited command file.
    ///
    /// # Errors
    /// Returns [`NodeError::MalformedCommandFile`] if the file is empty, its
    /// first command isn't `MOVE` (spec.md §4.9 invariant), or any line
    /// fails to parse.
    pub fn load(path: &Path) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NodeError::MalformedCommandFile(format!("{}: {e}", path.display())))?;
        let commands = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_line)
            .collect::<Result<Vec<_>, _>>()?;
        if commands.is_empty() {
            return Err(NodeError::MalformedCommandFile("empty command file".into()));
        }
        if !matches!(commands[0], Command::Move(_)) {
            return Err(NodeError::MalformedCommandFile(
                "first command must be MOVE".into(),
            ));
        }
        Ok(Self {
            commands,
            cursor: 0,
        })
    }

    /// Returns the next command, looping back to the start after the last.
    pub fn next(&mut self) -> Command {
        let command = self.commands[self.cursor];
        self.cursor = (self.cursor + 1) % self.commands.len();
        command
    }
}

fn parse_line(line: &str) -> Result<Command, NodeError> {
    let mut parts = line.split_whitespace();
    let keyword = parts
        .next()
        .ok_or_else(|| NodeError::MalformedCommandFile(format!("empty line: {line:?}")))?;
    let malformed = |reason: &str| NodeError::MalformedCommandFile(format!("{line:?}: {reason}"));

    match keyword {
        "MOVE" => {
            let port: u16 = parts
                .next()
                .ok_or_else(|| malformed("MOVE requires a port"))?
                .parse()
                .map_err(|_| malformed("invalid port"))?;
            if !(1025..=65535).contains(&port) {
                return Err(malformed("port out of range [1025, 65535]"));
            }
            Ok(Command::Move(port))
        }
        "WAIT" => {
            let seconds: f64 = parts
                .next()
                .ok_or_else(|| malformed("WAIT requires seconds"))?
                .parse()
                .map_err(|_| malformed("invalid seconds"))?;
            if seconds < 1.0 {
                return Err(malformed("WAIT seconds must be >= 1.0"));
            }
            Ok(Command::Wait(seconds))
        }
        "POSITIVE" => {
            let period: u64 = parts
                .next()
                .ok_or_else(|| malformed("POSITIVE requires a period"))?
                .parse()
                .map_err(|_| malformed("invalid period"))?;
            Ok(Command::Positive(period))
        }
        "STOP" => Ok(Command::Stop),
        other => Err(malformed(&format!("unknown command {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_script(contents: &str) -> tempfile_stub::NamedFile {
        tempfile_stub::NamedFile::write(contents)
    }

    // A tiny stand-in for `tempfile` so this module's tests don't need a
    // new dev-dependency just to write one throwaway file.
    mod tempfile_stub {
        use std::path::PathBuf;

        pub struct NamedFile {
            pub path: PathBuf,
        }

        impl NamedFile {
            pub fn write(contents: &str) -> Self {
                let path = std::env::temp_dir().join(format!(
                    "dimy-node-test-{}-{}.txt",
                    std::process::id(),
                    contents.len()
                ));
                std::fs::write(&path, contents).expect("write temp command file");
                Self { path }
            }
        }

        impl Drop for NamedFile {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.path);
            }
        }
    }

    #[test]
    fn parses_and_loops_a_well_formed_script() {
        let file = write_script("MOVE 50000\nWAIT 5\nPOSITIVE 600\nSTOP\n");
        let mut script = CommandScript::load(&file.path).expect("parses");
        assert_eq!(script.next(), Command::Move(50000));
        assert_eq!(script.next(), Command::Wait(5.0));
        assert_eq!(script.next(), Command::Positive(600));
        assert_eq!(script.next(), Command::Stop);
        assert_eq!(script.next(), Command::Move(50000));
    }

    #[test]
    fn rejects_script_not_starting_with_move() {
        let file = write_script("WAIT 5\n");
        assert!(CommandScript::load(&file.path).is_err());
    }

    #[test]
    fn rejects_empty_script() {
        let file = write_script("");
        assert!(CommandScript::load(&file.path).is_err());
    }

    #[test]
    fn rejects_port_out_of_range() {
        let file = write_script("MOVE 80\n");
        assert!(CommandScript::load(&file.path).is_err());
    }
}
