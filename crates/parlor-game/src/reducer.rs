//! The room reducer: `(state, action) → next state`.
//!
//! [`apply`] is total. Actions that make no sense for the current state
//! (a non-admin starting a round, renaming someone who left) are absorbed
//! as no-ops, sometimes with a log entry, and never reported as errors.

use crate::{Action, Player, PlayerId, RandomSource, RoomState, WordList};

/// Log entry appended when a round starts.
pub const ROUND_STARTED: &str = "New round started";

/// Applies one action and returns the resulting state.
///
/// `words` and `rng` are only consulted by [`Action::StartRound`].
pub fn apply<R>(
    state: RoomState,
    action: Action,
    words: &WordList,
    rng: &mut R,
) -> RoomState
where
    R: RandomSource + ?Sized,
{
    match action {
        Action::AddPlayer(id) => add_player(state, id),
        Action::RemovePlayer(id) => remove_player(state, &id),
        Action::AppendLog(message) => append_log(state, message),
        Action::RenamePlayer { id, name } => rename_player(state, &id, name),
        Action::StartRound { requesting } => {
            start_round(state, &requesting, words, rng)
        }
    }
}

/// Returns the room's admin, or `None` for an empty room.
pub fn find_admin(state: &RoomState) -> Option<&Player> {
    state.players.iter().find(|p| p.is_admin)
}

fn add_player(mut state: RoomState, id: PlayerId) -> RoomState {
    let is_admin = state.players.is_empty();
    state.event_log.push(format!("User {id} joined the game."));
    state.players.push(Player::joined(id, is_admin));
    state
}

fn remove_player(mut state: RoomState, id: &PlayerId) -> RoomState {
    let (removed, kept): (Vec<Player>, Vec<Player>) =
        state.players.into_iter().partition(|p| &p.id == id);
    state.players = kept;

    let mut entry = format!("User {id} left the game.");

    if removed.iter().any(|p| p.is_admin) {
        if let Some(next) = state.players.first_mut() {
            next.is_admin = true;
            entry.push_str(&format!(" User {} is now admin.", next.id));
        }
    }

    // The round cannot continue without its imposter.
    if state.round_active && removed.iter().any(|p| p.is_special_role) {
        end_round(&mut state);
        entry.push_str(" The round has ended.");
    }

    state.event_log.push(entry);
    state
}

fn append_log(mut state: RoomState, message: String) -> RoomState {
    state.event_log.push(message);
    state
}

fn rename_player(
    mut state: RoomState,
    id: &PlayerId,
    name: String,
) -> RoomState {
    state.event_log.push(format!("User {id} updated name to {name}."));
    for player in state.players.iter_mut().filter(|p| &p.id == id) {
        player.display_name = Some(name.clone());
    }
    state
}

fn start_round<R>(
    mut state: RoomState,
    requesting: &PlayerId,
    words: &WordList,
    rng: &mut R,
) -> RoomState
where
    R: RandomSource + ?Sized,
{
    let is_admin = state.player(requesting).is_some_and(|p| p.is_admin);
    if !is_admin {
        return state;
    }

    let imposter = pick(rng, state.players.len());
    for (index, player) in state.players.iter_mut().enumerate() {
        player.is_special_role = index == imposter;
    }

    let word = pick(rng, words.len());
    state.secret_value = words.get(word).unwrap_or_default().to_string();
    state.round_active = true;
    state.event_log.push(ROUND_STARTED.to_string());
    state
}

fn end_round(state: &mut RoomState) {
    state.round_active = false;
    state.secret_value.clear();
    for player in &mut state.players {
        player.is_special_role = false;
    }
}

/// Draws an index in `0..len`, folding out-of-range answers from a
/// misbehaving source back into range.
fn pick<R: RandomSource + ?Sized>(rng: &mut R, len: usize) -> usize {
    rng.pick_index(len) % len
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always answers the same index.
    struct FixedIndex(usize);

    impl RandomSource for FixedIndex {
        fn pick_index(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn words() -> WordList {
        WordList::new(["apple", "banana", "cherry"]).unwrap()
    }

    fn run(state: RoomState, actions: Vec<Action>) -> RoomState {
        let words = words();
        let mut rng = FixedIndex(0);
        actions
            .into_iter()
            .fold(state, |s, a| apply(s, a, &words, &mut rng))
    }

    fn room_abc() -> RoomState {
        run(
            RoomState::new(),
            vec![
                Action::AddPlayer(id("A")),
                Action::AddPlayer(id("B")),
                Action::AddPlayer(id("C")),
            ],
        )
    }

    fn admins(state: &RoomState) -> Vec<&str> {
        state
            .players
            .iter()
            .filter(|p| p.is_admin)
            .map(|p| p.id.as_str())
            .collect()
    }

    // =====================================================================
    // AddPlayer
    // =====================================================================

    #[test]
    fn test_first_player_becomes_admin() {
        let state = room_abc();
        assert_eq!(admins(&state), ["A"]);
        assert!(state.players.iter().all(|p| !p.is_special_role));
        assert!(state.players.iter().all(|p| p.display_name.is_none()));
    }

    #[test]
    fn test_add_player_keeps_join_order_and_logs() {
        let state = room_abc();
        let ids: Vec<&str> =
            state.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(state.event_log[0], "User A joined the game.");
        assert_eq!(state.event_log.len(), 3);
    }

    #[test]
    fn test_add_player_does_not_reject_duplicates() {
        let state = run(
            RoomState::new(),
            vec![Action::AddPlayer(id("A")), Action::AddPlayer(id("A"))],
        );
        assert_eq!(state.players.len(), 2);
        assert_eq!(admins(&state), ["A"]);
    }

    // =====================================================================
    // RemovePlayer
    // =====================================================================

    #[test]
    fn test_removing_admin_promotes_next_in_join_order() {
        let state = run(room_abc(), vec![Action::RemovePlayer(id("A"))]);
        assert_eq!(admins(&state), ["B"]);
        assert_eq!(
            state.event_log.last().unwrap(),
            "User A left the game. User B is now admin."
        );
    }

    #[test]
    fn test_removing_last_player_leaves_no_admin() {
        let state = run(
            room_abc(),
            vec![
                Action::RemovePlayer(id("A")),
                Action::RemovePlayer(id("B")),
                Action::RemovePlayer(id("C")),
            ],
        );
        assert!(state.players.is_empty());
        assert!(find_admin(&state).is_none());
        assert_eq!(state.event_log.last().unwrap(), "User C left the game.");
    }

    #[test]
    fn test_removing_non_admin_keeps_admin() {
        let state = run(room_abc(), vec![Action::RemovePlayer(id("B"))]);
        assert_eq!(admins(&state), ["A"]);
        assert_eq!(state.event_log.last().unwrap(), "User B left the game.");
    }

    #[test]
    fn test_remove_unknown_id_only_appends_log() {
        let before = run(
            RoomState::new(),
            vec![Action::AddPlayer(id("A")), Action::AddPlayer(id("B"))],
        );
        let after =
            run(before.clone(), vec![Action::RemovePlayer(id("nonexistent-id"))]);
        assert_eq!(after.players, before.players);
        assert_eq!(after.event_log.len(), before.event_log.len() + 1);
        assert_eq!(
            after.event_log.last().unwrap(),
            "User nonexistent-id left the game."
        );
    }

    #[test]
    fn test_removing_imposter_ends_round() {
        // FixedIndex(1) makes B the imposter.
        let words = words();
        let mut rng = FixedIndex(1);
        let state = apply(
            room_abc(),
            Action::StartRound { requesting: id("A") },
            &words,
            &mut rng,
        );
        assert_eq!(state.special_role().unwrap().id, id("B"));

        let state = run(state, vec![Action::RemovePlayer(id("B"))]);
        assert!(!state.round_active);
        assert!(state.secret_value.is_empty());
        assert!(state.special_role().is_none());
        assert_eq!(
            state.event_log.last().unwrap(),
            "User B left the game. The round has ended."
        );
    }

    #[test]
    fn test_removing_bystander_keeps_round() {
        let state = run(
            room_abc(),
            vec![
                Action::StartRound { requesting: id("A") },
                Action::RemovePlayer(id("C")),
            ],
        );
        assert!(state.round_active);
        assert_eq!(state.special_role().unwrap().id, id("A"));
    }

    #[test]
    fn test_removing_admin_imposter_promotes_and_ends_round_in_one_entry() {
        let state = run(
            room_abc(),
            vec![
                Action::StartRound { requesting: id("A") },
                Action::RemovePlayer(id("A")),
            ],
        );
        assert_eq!(admins(&state), ["B"]);
        assert!(!state.round_active);
        // 3 joins + round start + departure
        assert_eq!(state.event_log.len(), 5);
        assert_eq!(
            state.event_log.last().unwrap(),
            "User A left the game. User B is now admin. The round has ended."
        );
    }

    // =====================================================================
    // RenamePlayer / AppendLog
    // =====================================================================

    #[test]
    fn test_rename_sets_display_name() {
        let state = run(
            room_abc(),
            vec![Action::RenamePlayer { id: id("B"), name: "Bea".into() }],
        );
        assert_eq!(
            state.player(&id("B")).unwrap().display_name.as_deref(),
            Some("Bea")
        );
        assert_eq!(
            state.event_log.last().unwrap(),
            "User B updated name to Bea."
        );
    }

    #[test]
    fn test_rename_twice_is_idempotent_on_name() {
        let rename = Action::RenamePlayer { id: id("A"), name: "Ann".into() };
        let once = run(room_abc(), vec![rename.clone()]);
        let twice = run(room_abc(), vec![rename.clone(), rename]);
        assert_eq!(once.players, twice.players);
        assert_eq!(twice.event_log.len(), once.event_log.len() + 1);
    }

    #[test]
    fn test_rename_unknown_player_still_logs() {
        let before = room_abc();
        let after = run(
            before.clone(),
            vec![Action::RenamePlayer { id: id("Z"), name: "Zed".into() }],
        );
        assert_eq!(after.players, before.players);
        assert_eq!(after.event_log.len(), before.event_log.len() + 1);
    }

    #[test]
    fn test_append_log_is_verbatim() {
        let before = room_abc();
        let after =
            run(before.clone(), vec![Action::AppendLog("  hi there ".into())]);
        assert_eq!(after.players, before.players);
        assert_eq!(after.event_log.last().unwrap(), "  hi there ");
    }

    // =====================================================================
    // StartRound
    // =====================================================================

    #[test]
    fn test_start_round_by_admin() {
        let state = run(
            room_abc(),
            vec![Action::StartRound { requesting: id("A") }],
        );
        assert!(state.round_active);
        assert_eq!(
            state.players.iter().filter(|p| p.is_special_role).count(),
            1
        );
        assert!(words().contains(&state.secret_value));
        assert_eq!(state.event_log.len(), 4);
        assert_eq!(state.event_log.last().unwrap(), ROUND_STARTED);
    }

    #[test]
    fn test_start_round_by_non_admin_is_noop() {
        let before = room_abc();
        let after = run(
            before.clone(),
            vec![Action::StartRound { requesting: id("B") }],
        );
        assert_eq!(after, before);
    }

    #[test]
    fn test_start_round_by_unknown_is_noop() {
        let before = room_abc();
        let after = run(
            before.clone(),
            vec![Action::StartRound { requesting: id("ghost") }],
        );
        assert_eq!(after, before);
    }

    #[test]
    fn test_start_round_with_fixed_source_is_deterministic() {
        let words = words();
        for index in 0..3 {
            let a = apply(
                room_abc(),
                Action::StartRound { requesting: id("A") },
                &words,
                &mut FixedIndex(index),
            );
            let b = apply(
                room_abc(),
                Action::StartRound { requesting: id("A") },
                &words,
                &mut FixedIndex(index),
            );
            assert_eq!(a, b);
            assert!(a.players[index].is_special_role);
            assert_eq!(a.secret_value, words.get(index).unwrap());
        }
    }

    #[test]
    fn test_new_round_reassigns_special_role() {
        let words = words();
        let first = apply(
            room_abc(),
            Action::StartRound { requesting: id("A") },
            &words,
            &mut FixedIndex(0),
        );
        let second = apply(
            first,
            Action::StartRound { requesting: id("A") },
            &words,
            &mut FixedIndex(2),
        );
        let flagged: Vec<&str> = second
            .players
            .iter()
            .filter(|p| p.is_special_role)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(flagged, ["C"]);
        assert_eq!(second.secret_value, "cherry");
    }

    #[test]
    fn test_out_of_range_source_is_folded_into_range() {
        let state = apply(
            room_abc(),
            Action::StartRound { requesting: id("A") },
            &words(),
            &mut FixedIndex(4),
        );
        // 4 % 3 players == 1, 4 % 3 words == 1
        assert_eq!(state.special_role().unwrap().id, id("B"));
        assert_eq!(state.secret_value, "banana");
    }

    // =====================================================================
    // find_admin
    // =====================================================================

    #[test]
    fn test_find_admin() {
        assert!(find_admin(&RoomState::new()).is_none());
        assert_eq!(find_admin(&room_abc()).unwrap().id, id("A"));
    }
}
