//! Presence roster rendering.
//!
//! A roster is rendered per viewer: the viewer's own entry comes first and is
//! never marked inactive, every other member follows in registry order.

use bytes::Bytes;

use super::{Activity, ConnectionId, DisplayName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: DisplayName,
    pub activity: Activity,
    /// The entry describes the client the roster is rendered for.
    pub is_viewer: bool,
}

impl RosterEntry {
    /// Whether the entry should carry an inactivity marker.
    pub fn is_inactive(&self) -> bool {
        !self.is_viewer && !self.activity.is_active()
    }
}

/// Roster as seen by one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

/// Render the roster for `viewer` from the registry contents.
///
/// `members` must be yielded in registry order. Names are neither validated
/// nor deduplicated. If `viewer` is not among `members` the roster simply has
/// no viewer entry.
pub fn render_roster<'a, I>(members: I, viewer: ConnectionId) -> Roster
where
    I: IntoIterator<Item = (ConnectionId, &'a DisplayName, Activity)>,
{
    let mut own = None;
    let mut others = Vec::new();

    for (id, name, activity) in members {
        if id == viewer && own.is_none() {
            own = Some(RosterEntry {
                name: name.clone(),
                activity: Activity::Active,
                is_viewer: true,
            });
        } else {
            others.push(RosterEntry {
                name: name.clone(),
                activity,
                is_viewer: false,
            });
        }
    }

    let mut entries = Vec::with_capacity(others.len() + 1);
    entries.extend(own);
    entries.extend(others);
    Roster { entries }
}

/// Turns a roster into the payload sent to the viewer.
#[cfg_attr(test, mockall::automock)]
pub trait RosterFormatter: Send + Sync {
    fn format(&self, roster: &Roster) -> Bytes;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> DisplayName {
        DisplayName::new(raw).unwrap()
    }

    #[test]
    fn test_render_roster_puts_viewer_first() {
        // テスト項目: 閲覧者自身のエントリが先頭に来て、残りは登録順に並ぶ
        // given (前提条件):
        let (alice, bob, carol) = (name("alice"), name("bob"), name("carol"));
        let members = vec![
            (ConnectionId::new(1), &alice, Activity::Active),
            (ConnectionId::new(2), &bob, Activity::Active),
            (ConnectionId::new(3), &carol, Activity::Active),
        ];

        // when (操作):
        let roster = render_roster(members, ConnectionId::new(2));

        // then (期待する結果):
        assert_eq!(roster.names(), vec!["bob", "alice", "carol"]);
        assert!(roster.entries()[0].is_viewer);
    }

    #[test]
    fn test_render_roster_never_marks_viewer_inactive() {
        // テスト項目: 閲覧者自身が inactive でも inactive 表示にならない
        // given (前提条件):
        let (alice, bob) = (name("alice"), name("bob"));
        let members = vec![
            (ConnectionId::new(1), &alice, Activity::Inactive),
            (ConnectionId::new(2), &bob, Activity::Inactive),
        ];

        // when (操作):
        let roster = render_roster(members, ConnectionId::new(1));

        // then (期待する結果):
        assert!(!roster.entries()[0].is_inactive());
        assert!(roster.entries()[1].is_inactive());
    }

    #[test]
    fn test_render_roster_keeps_duplicate_names() {
        // テスト項目: 同じ表示名のクライアントが重複排除されない
        // given (前提条件):
        let (first, second) = (name("guest"), name("guest"));
        let members = vec![
            (ConnectionId::new(1), &first, Activity::Active),
            (ConnectionId::new(2), &second, Activity::Active),
        ];

        // when (操作):
        let roster = render_roster(members, ConnectionId::new(1));

        // then (期待する結果):
        assert_eq!(roster.names(), vec!["guest", "guest"]);
    }

    #[test]
    fn test_render_roster_without_viewer() {
        // テスト項目: 閲覧者が登録されていない場合、他のメンバーのみが並ぶ
        // given (前提条件):
        let alice = name("alice");
        let members = vec![(ConnectionId::new(1), &alice, Activity::Active)];

        // when (操作):
        let roster = render_roster(members, ConnectionId::new(99));

        // then (期待する結果):
        assert_eq!(roster.len(), 1);
        assert!(!roster.entries()[0].is_viewer);
    }

    #[test]
    fn test_render_roster_empty() {
        // テスト項目: メンバーがいない場合は空のロスターになる
        // given (前提条件):
        let members: Vec<(ConnectionId, &DisplayName, Activity)> = Vec::new();

        // when (操作):
        let roster = render_roster(members, ConnectionId::new(1));

        // then (期待する結果):
        assert!(roster.is_empty());
    }
}
