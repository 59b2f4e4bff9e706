use super::*;

/// Games, losses or streak length that count as a milestone.
const MILESTONE: u32 = 69;

const SPEEDRUN_LIMIT: Duration = Duration::from_secs(20);

/// Every achievement players can unlock. Ids are persisted, never reuse one.
pub static CATALOG: [Achievement; 15] = [
    Achievement {
        id: 0,
        name: "Cleared",
        description: "Win your first game of minesweeper",
        check: won,
    },
    Achievement {
        id: 1,
        name: "Kaboom",
        description: "Lose your first game of minesweeper",
        check: lost,
    },
    Achievement {
        id: 2,
        name: "Out Of Tune",
        description: "Chord into a mine",
        check: failed_chord,
    },
    Achievement {
        id: 3,
        name: "Perfect Pitch",
        description: "Open cells with a chord",
        check: successful_chord,
    },
    Achievement {
        id: 4,
        name: "Leap Of Faith",
        description: "Click a cell with no opened cell around it",
        check: blind_click,
    },
    Achievement {
        id: 5,
        name: "Virtuoso",
        description: "Keep a 69 game streak going with a chord-only win in 20 seconds",
        check: virtuoso,
    },
    Achievement {
        id: 6,
        name: "Can't Count",
        description: "Click a mine a revealed number already gave away",
        check: obvious_mine,
    },
    Achievement {
        id: 7,
        name: "Not So Nice",
        description: "Lose 69 times on one difficulty",
        check: losses_milestone,
    },
    Achievement {
        id: 8,
        name: "Nice",
        description: "Win 69 times on one difficulty",
        check: wins_milestone,
    },
    Achievement {
        id: 9,
        name: "Really Nice",
        description: "Reach a 69 win streak on one difficulty",
        check: streak_milestone,
    },
    Achievement {
        id: 10,
        name: "Spotter",
        description: "Flag a mine",
        check: correct_flag,
    },
    Achievement {
        id: 11,
        name: "False Alarm",
        description: "Flag a cell that is not a mine",
        check: wrong_flag,
    },
    Achievement {
        id: 12,
        name: "Stale Bread",
        description: "Let the game time out",
        check: timed_out,
    },
    Achievement {
        id: 13,
        name: "How Lucky",
        description: "Win the game in a single click",
        check: one_click_win,
    },
    Achievement {
        id: 14,
        name: "Purity",
        description: "Win using nothing but chords",
        check: chord_only_win,
    },
];

pub fn find_achievement(id: AchievementId) -> Option<&'static Achievement> {
    CATALOG.iter().find(|achievement| achievement.id == id)
}

fn won(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.outcome == Outcome::Won
}

fn lost(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.outcome == Outcome::Lost
}

fn failed_chord(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.chorded && snapshot.outcome == Outcome::Lost
}

fn successful_chord(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.chorded && snapshot.outcome != Outcome::Lost && snapshot.revealed > 0
}

fn blind_click(snapshot: &Snapshot<'_>, _: &History) -> bool {
    if snapshot.phase != Phase::BeforeReveal {
        return false;
    }
    let Some(cell) = snapshot.clicked() else {
        return false;
    };
    cell.state() == CellState::Hidden
        && snapshot
            .game
            .neighbor_cells(cell.pos())
            .all(|neighbor| neighbor.state() == CellState::Hidden)
}

fn virtuoso(snapshot: &Snapshot<'_>, history: &History) -> bool {
    snapshot.outcome == Outcome::Won
        && history.win_streak >= MILESTONE
        && !history.actions.contains(Actions::REVEALED)
        && history.actions.contains(Actions::FLAGGED | Actions::CHORDED)
        && history.elapsed <= SPEEDRUN_LIMIT
}

/// Lost on a mine diagonal to a revealed number whose safe neighbors were all
/// open already, so every hidden cell around it had to be a mine.
fn obvious_mine(snapshot: &Snapshot<'_>, _: &History) -> bool {
    if snapshot.outcome != Outcome::Lost {
        return false;
    }
    let Some(mine) = snapshot.clicked().filter(|cell| cell.is_mine()) else {
        return false;
    };
    let (x, y) = mine.pos();
    let game = snapshot.game;

    [(-1, -1), (1, -1), (-1, 1), (1, 1)]
        .into_iter()
        .filter_map(|(dx, dy)| Some((x.checked_add_signed(dx)?, y.checked_add_signed(dy)?)))
        .filter_map(|pos| game.find_cell(pos).ok())
        .filter(|corner| corner.is_revealed())
        .any(|corner| {
            let (mut total, mut open) = (0, 0);
            for neighbor in game.neighbor_cells(corner.pos()) {
                total += 1;
                if neighbor.is_revealed() {
                    open += 1;
                }
            }
            open + usize::from(corner.adjacent_mines()) == total
        })
}

fn terminal(snapshot: &Snapshot<'_>) -> bool {
    snapshot.outcome.is_terminal()
}

fn losses_milestone(snapshot: &Snapshot<'_>, history: &History) -> bool {
    terminal(snapshot) && history.losses >= MILESTONE
}

fn wins_milestone(snapshot: &Snapshot<'_>, history: &History) -> bool {
    terminal(snapshot) && history.wins >= MILESTONE
}

fn streak_milestone(snapshot: &Snapshot<'_>, history: &History) -> bool {
    terminal(snapshot) && history.win_streak >= MILESTONE
}

fn correct_flag(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.flagged && snapshot.clicked().is_some_and(|cell| cell.is_mine())
}

fn wrong_flag(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.flagged && snapshot.clicked().is_some_and(|cell| !cell.is_mine())
}

fn timed_out(snapshot: &Snapshot<'_>, _: &History) -> bool {
    snapshot.outcome == Outcome::TimedOut
}

fn one_click_win(snapshot: &Snapshot<'_>, history: &History) -> bool {
    snapshot.outcome == Outcome::Won && history.moves == 1
}

fn chord_only_win(snapshot: &Snapshot<'_>, history: &History) -> bool {
    snapshot.outcome == Outcome::Won
        && history.actions.contains(Actions::CHORDED)
        && !history.actions.contains(Actions::REVEALED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::new(MineLayout::from_mine_coords(size, mines).unwrap(), None).unwrap()
    }

    fn ids(snapshot: &Snapshot<'_>, history: &History) -> Vec<AchievementId> {
        evaluate(&CATALOG, snapshot, history).into_iter().collect()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let unique: BTreeSet<_> = CATALOG.iter().map(|achievement| achievement.id).collect();
        assert_eq!(unique.len(), CATALOG.len());
        assert_eq!(find_achievement(6).map(|achievement| achievement.name), Some("Can't Count"));
        assert!(find_achievement(99).is_none());
    }

    #[test]
    fn nothing_fires_on_a_plain_reveal() {
        let mut game = game((3, 3), &[(0, 0)]);
        game.reveal((1, 1)).unwrap();
        let snapshot = Snapshot::after_action(&game, Outcome::Nothing)
            .with_cell((1, 1))
            .with_reveal(1);

        assert!(ids(&snapshot, &History::default()).is_empty());
    }

    #[test]
    fn first_win_and_one_click() {
        let mut game = game((3, 3), &[(0, 0)]);
        let outcome = game.reveal((2, 2)).unwrap();
        assert_eq!(outcome, Outcome::Won);

        let snapshot = Snapshot::after_action(&game, outcome).with_cell((2, 2));
        let history = History {
            wins: 1,
            win_streak: 1,
            actions: Actions::REVEALED,
            moves: 1,
            ..Default::default()
        };

        assert_eq!(ids(&snapshot, &history), vec![0, 13]);
    }

    #[test]
    fn chord_into_mine_is_out_of_tune() {
        let mut game = game((3, 3), &[(0, 0)]);
        game.reveal((1, 1)).unwrap();
        game.toggle_flag((2, 2)).unwrap();
        let outcome = game.chord((1, 1)).unwrap();

        let snapshot = Snapshot::after_action(&game, outcome)
            .with_cell((1, 1))
            .with_chord(0);
        let history = History {
            losses: 1,
            ..Default::default()
        };

        assert_eq!(ids(&snapshot, &history), vec![1, 2]);
    }

    #[test]
    fn chord_that_opens_cells_is_in_tune() {
        let mut game = game((4, 1), &[(0, 0)]);
        game.reveal((1, 0)).unwrap();
        game.toggle_flag((0, 0)).unwrap();
        let before = game.safe_cells_left();
        let outcome = game.chord((1, 0)).unwrap();
        let revealed = before - game.safe_cells_left();

        let snapshot = Snapshot::after_action(&game, outcome)
            .with_cell((1, 0))
            .with_chord(revealed);
        assert!(successful_chord(&snapshot, &History::default()));

        let idle = Snapshot::after_action(&game, Outcome::Nothing)
            .with_cell((1, 0))
            .with_chord(0);
        assert!(!successful_chord(&idle, &History::default()));
    }

    #[test]
    fn blind_click_needs_hidden_surroundings() {
        let mut game = game((5, 1), &[(2, 0)]);
        let first = Snapshot::before_reveal(&game, (0, 0));
        assert!(blind_click(&first, &History::default()));

        game.reveal((0, 0)).unwrap();
        let next_to_open = Snapshot::before_reveal(&game, (2, 0));
        assert!(!blind_click(&next_to_open, &History::default()));
        let far_away = Snapshot::before_reveal(&game, (4, 0));
        assert!(blind_click(&far_away, &History::default()));

        let after = Snapshot::after_action(&game, Outcome::Nothing).with_cell((4, 0));
        assert!(!blind_click(&after, &History::default()));
    }

    #[test]
    fn obvious_mine_needs_a_solved_diagonal() {
        // 1 at (0, 0) touches a single hidden cell once (1, 0) and (0, 1) are open
        let mut game = game((3, 3), &[(1, 1), (2, 2)]);
        game.reveal((0, 0)).unwrap();
        game.reveal((1, 0)).unwrap();
        game.reveal((0, 1)).unwrap();
        let outcome = game.reveal((1, 1)).unwrap();
        assert_eq!(outcome, Outcome::Lost);

        let snapshot = Snapshot::after_action(&game, outcome).with_cell((1, 1));
        assert!(obvious_mine(&snapshot, &History::default()));
    }

    #[test]
    fn unlucky_mine_is_not_obvious() {
        let mut game = game((3, 3), &[(1, 1), (2, 2)]);
        let outcome = game.reveal((1, 1)).unwrap();

        let snapshot = Snapshot::after_action(&game, outcome).with_cell((1, 1));
        assert!(!obvious_mine(&snapshot, &History::default()));
    }

    #[test]
    fn flags_are_judged_against_the_true_cell() {
        let mut game = game((3, 3), &[(0, 0)]);
        game.toggle_flag((0, 0)).unwrap();
        game.toggle_flag((1, 1)).unwrap();

        let right = Snapshot::after_action(&game, Outcome::Nothing)
            .with_cell((0, 0))
            .with_flag();
        let wrong = Snapshot::after_action(&game, Outcome::Nothing)
            .with_cell((1, 1))
            .with_flag();

        assert_eq!(ids(&right, &History::default()), vec![10]);
        assert_eq!(ids(&wrong, &History::default()), vec![11]);
    }

    #[test]
    fn milestones_only_on_terminal_outcomes() {
        let game = game((3, 3), &[(0, 0)]);
        let history = History {
            wins: 69,
            losses: 69,
            win_streak: 0,
            ..Default::default()
        };

        let ongoing = Snapshot::after_action(&game, Outcome::Nothing);
        assert!(ids(&ongoing, &history).is_empty());

        let abandoned = Snapshot::after_action(&game, Outcome::ManuallyEnded);
        assert_eq!(ids(&abandoned, &history), vec![7, 8]);

        let timed_out = Snapshot::after_action(&game, Outcome::TimedOut);
        assert_eq!(ids(&timed_out, &history), vec![7, 8, 12]);
    }

    #[test]
    fn chord_only_wins() {
        let game = game((3, 3), &[(0, 0)]);
        let won = Snapshot::after_action(&game, Outcome::Won);
        let mut history = History {
            wins: 70,
            win_streak: 69,
            actions: Actions::FLAGGED | Actions::CHORDED,
            moves: 4,
            elapsed: Duration::from_secs(12),
            ..Default::default()
        };

        assert_eq!(ids(&won, &history), vec![0, 5, 8, 9, 14]);

        history.elapsed = Duration::from_secs(30);
        assert!(!virtuoso(&won, &history));

        history.actions |= Actions::REVEALED;
        assert!(!chord_only_win(&won, &history));
    }

    #[test]
    fn evaluation_order_does_not_matter() {
        let mut game = game((3, 3), &[(0, 0)]);
        let outcome = game.reveal((0, 0)).unwrap();
        let snapshot = Snapshot::after_action(&game, outcome).with_cell((0, 0));
        let history = History {
            losses: 69,
            ..Default::default()
        };

        let mut reversed = CATALOG;
        reversed.reverse();

        assert_eq!(
            evaluate(&CATALOG, &snapshot, &history),
            evaluate(&reversed, &snapshot, &history)
        );
    }
}
