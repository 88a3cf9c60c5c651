/// Classes of auth-log events that trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    PrivilegedCommand,
    SessionOpened,
}

impl EventClass {
    pub const ALL: [EventClass; 2] = [EventClass::PrivilegedCommand, EventClass::SessionOpened];

    /// Substrings that must ALL be present in a line for it to match this class.
    pub fn required_substrings(self) -> &'static [&'static str] {
        match self {
            EventClass::PrivilegedCommand => &["sudo", "COMMAND"],
            EventClass::SessionOpened => &["sshd:session", "session opened"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventClass::PrivilegedCommand => "privileged command",
            EventClass::SessionOpened => "SSH session opened",
        }
    }
}

#[derive(Debug, Default)]
pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Classify a log line. A line matches a class only when every required
    /// substring for that class is contained in it; privileged-command lines
    /// take precedence when a line would match both classes.
    pub fn match_line(&self, line: &str) -> Option<EventClass> {
        EventClass::ALL
            .into_iter()
            .find(|class| Self::matches_class(line, *class))
    }

    fn matches_class(line: &str, class: EventClass) -> bool {
        class
            .required_substrings()
            .iter()
            .all(|needle| line.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_command_match() {
        let matcher = Matcher::new();
        let line = "Mar 1 00:00:02 host sudo: alice : COMMAND=/bin/ls";
        assert_eq!(matcher.match_line(line), Some(EventClass::PrivilegedCommand));
    }

    #[test]
    fn test_session_opened_match() {
        let matcher = Matcher::new();
        let line =
            "Mar 1 00:00:01 host sshd[123]: pam_unix(sshd:session): session opened for user root";
        assert_eq!(matcher.match_line(line), Some(EventClass::SessionOpened));
    }

    #[test]
    fn test_single_substring_does_not_match() {
        let matcher = Matcher::new();
        // Each line carries only one of the two required substrings.
        assert_eq!(matcher.match_line("host sudo: alice : TTY=pts/0"), None);
        assert_eq!(matcher.match_line("host cron[99]: COMMAND scheduled"), None);
        assert_eq!(
            matcher.match_line("host sshd[123]: pam_unix(sshd:session): session closed"),
            None
        );
        assert_eq!(matcher.match_line("host login: session opened for user bob"), None);
    }

    #[test]
    fn test_unrelated_line_does_not_match() {
        let matcher = Matcher::new();
        assert_eq!(matcher.match_line("Mar 1 00:00:03 host CRON[456]: pam_unix(cron:session)"), None);
        assert_eq!(matcher.match_line(""), None);
    }

    #[test]
    fn test_trailing_newline_preserved_lines_still_match() {
        let matcher = Matcher::new();
        let line = "Mar 1 00:00:02 host sudo: alice : COMMAND=/bin/ls\n";
        assert_eq!(matcher.match_line(line), Some(EventClass::PrivilegedCommand));
    }

    #[test]
    fn test_privileged_command_takes_precedence() {
        let matcher = Matcher::new();
        let line = "host sudo: COMMAND via sshd:session after session opened";
        assert_eq!(matcher.match_line(line), Some(EventClass::PrivilegedCommand));
    }
}
