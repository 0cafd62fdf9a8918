//! Tab completion for `/itemslore`.

use crate::host::OnlinePlayers;
use crate::lore::{ExistingLoreMode, TemplateSelector};
use crate::plugin::ItemLorePlugin;

pub const SUBCOMMANDS: [&str; 7] = ["clear", "give", "help", "mode", "random", "reload", "template"];
pub const TEMPLATE_SUBCOMMANDS: [&str; 3] = ["apply", "info", "list"];

/// Candidates starting with `token` (ignoring case), sorted.
///
/// # Examples
///
/// ```
/// use itemlore::commands::partial_matches;
///
/// assert_eq!(partial_matches("RE", ["reload", "random", "remove"]), vec!["reload", "remove"]);
/// ```
pub fn partial_matches<I, S>(token: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let token = token.to_ascii_lowercase();
    let mut matches: Vec<String> = candidates
        .into_iter()
        .map(|candidate| candidate.as_ref().to_string())
        .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&token))
        .collect();
    matches.sort();
    matches
}

impl ItemLorePlugin {
    /// Completions for the last of `args`.
    pub fn tab_complete<S: AsRef<str>>(&self, args: &[S], players: &OnlinePlayers) -> Vec<String> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        match args.as_slice() {
            [token] => partial_matches(token, SUBCOMMANDS),
            [command, token] => match command.to_ascii_lowercase().as_str() {
                "template" => partial_matches(token, TEMPLATE_SUBCOMMANDS),
                "mode" => partial_matches(token, ExistingLoreMode::ALL.iter().map(|mode| mode.as_str())),
                "give" => partial_matches(token, players.names()),
                _ => Vec::new(),
            },
            [command, sub, token]
                if command.eq_ignore_ascii_case("template")
                    && (sub.eq_ignore_ascii_case("info") || sub.eq_ignore_ascii_case("apply")) =>
            {
                partial_matches(token, TemplateSelector::new(self.context()).names())
            }
            _ => Vec::new(),
        }
    }
}
