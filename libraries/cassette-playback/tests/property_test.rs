//! Property-based tests for the player
//!
//! Random sequences of UI actions and media events must never leave the
//! player in an inconsistent state.

mod common;

use common::{FakeFile, FakeMedia, Harness};
use futures::executor::block_on;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Upload,
    FailedUpload,
    PlayTrack(usize),
    SelectTrack(usize),
    Next,
    Play,
    Pause,
    Ready,
    TimeUpdate(u16),
    Ended,
    ChangeSource,
    RejectNextPlay(bool),
}

fn arbitrary_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Upload),
        1 => Just(Action::FailedUpload),
        2 => (0usize..8).prop_map(Action::PlayTrack),
        1 => (0usize..8).prop_map(Action::SelectTrack),
        2 => Just(Action::Next),
        2 => Just(Action::Play),
        1 => Just(Action::Pause),
        2 => Just(Action::Ready),
        2 => any::<u16>().prop_map(Action::TimeUpdate),
        1 => Just(Action::Ended),
        1 => Just(Action::ChangeSource),
        1 => any::<bool>().prop_map(Action::RejectNextPlay),
    ]
}

proptest! {
    /// Property: the selection always points into the playlist and playing
    /// implies a loaded source
    #[test]
    fn selection_and_play_state_stay_consistent(
        slow_media in any::<bool>(),
        actions in prop::collection::vec(arbitrary_action(), 1..60)
    ) {
        let media = if slow_media { FakeMedia::slow() } else { FakeMedia::instant() };
        let h = Harness::new(media);
        let mut player = block_on(h.open());
        let mut uploads = 0usize;

        for action in actions {
            let ticket = match action {
                Action::Upload => {
                    uploads += 1;
                    player.choose_file(FakeFile::audio(&format!("{uploads}.mp3"))).ok();
                    let _ = block_on(player.upload());
                    None
                }
                Action::FailedUpload => {
                    player.choose_file(FakeFile::unreadable("bad.mp3")).ok();
                    prop_assert!(block_on(player.upload()).is_err());
                    None
                }
                Action::PlayTrack(index) => player.play_track(index).ok().flatten(),
                Action::SelectTrack(index) => player.select_track(index).ok().flatten(),
                Action::Next => player.next_track(),
                Action::Play => player.play(),
                Action::Pause => {
                    player.pause();
                    None
                }
                Action::Ready => {
                    h.media.finish_loading();
                    player.on_ready()
                }
                Action::TimeUpdate(seconds) => {
                    h.media.set_time(f64::from(seconds));
                    player.on_time_update();
                    None
                }
                Action::Ended => player.on_ended(),
                Action::ChangeSource => player.change_source(),
                Action::RejectNextPlay(reject) => {
                    h.media.reject_play(reject.then_some("NotAllowedError"));
                    None
                }
            };
            block_on(player.drive(ticket));

            let len = player.playlist().len();
            prop_assert_eq!(len, h.store.len());
            match player.current_index() {
                Some(index) => prop_assert!(index < len),
                None => prop_assert!(len == 0 || h.media.current_source().is_none()),
            }
            if player.is_playing() {
                prop_assert!(h.media.current_source().is_some());
            }
        }
    }

    /// Property: ids follow insertion order and the playlist mirrors the store
    #[test]
    fn playlist_mirrors_store_order(count in 1usize..20) {
        let h = Harness::new(FakeMedia::instant());
        let mut player = block_on(h.open());

        for i in 0..count {
            block_on(h.upload(&mut player, &format!("{i}.mp3")));
        }

        let ids: Vec<_> = player.playlist().iter().map(|t| t.id).collect();
        let expected: Vec<_> = (1..=count as i64).collect();
        prop_assert_eq!(ids, expected);

        let reopened = block_on(h.open());
        prop_assert_eq!(reopened.playlist().tracks(), player.playlist().tracks());
    }
}
