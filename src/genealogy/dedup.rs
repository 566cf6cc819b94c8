use super::{Person, Relative};

/// True if `person` already has an entry in `relatives`.
///
/// Checked before every append during a build, which keeps each id unique in
/// the tree and stops the walk from re-entering ancestry that converges on
/// the same people through several lines.
pub fn already_in_family(person: &Person, relatives: &[Relative]) -> bool {
    relatives.iter().any(|r| r.person.id == person.id)
}
