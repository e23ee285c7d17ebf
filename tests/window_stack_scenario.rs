//! End-to-end window stack behavior through a `Session`.

use std::cell::RefCell;
use std::rc::Rc;

use spark_layout::{
    Dim, ElementId, ElementProps, Error, Session, SessionEvent, StackError, WindowState,
};

fn container(session: &mut Session, name: &str) -> ElementId {
    session.tree_mut().create(ElementProps {
        name: Some(name.into()),
        overlapped: Some(true),
        width: Some(Dim::fill(0)),
        height: Some(Dim::fill(0)),
        ..Default::default()
    })
}

fn window(session: &mut Session, name: &str) -> ElementId {
    session.tree_mut().create(ElementProps {
        name: Some(name.into()),
        width: Some(Dim::sized(20)),
        height: Some(Dim::sized(5)),
        ..Default::default()
    })
}

fn modal(session: &mut Session, name: &str) -> ElementId {
    session.tree_mut().create(ElementProps {
        name: Some(name.into()),
        modal: Some(true),
        ..Default::default()
    })
}

fn record(session: &mut Session) -> Rc<RefCell<Vec<SessionEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    session.subscribe(move |event, _| sink.borrow_mut().push(*event));
    log
}

fn closed(log: &[SessionEvent]) -> Vec<(ElementId, Option<ElementId>)> {
    log.iter()
        .filter_map(|e| match e {
            SessionEvent::WindowClosed { window, notify } => Some((*window, *notify)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_children_counted_as_they_become_ready() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    session.run(c).unwrap();
    session.iterate().unwrap();

    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = counts.clone();
    session.subscribe(move |event, session| {
        if let SessionEvent::WindowReady(_) = event {
            sink.borrow_mut().push(session.overlapped_children().len());
        }
    });

    for name in ["w1", "w2", "w3"] {
        let w = window(&mut session, name);
        session.run(w).unwrap();
        session.iterate().unwrap();
    }

    assert_eq!(*counts.borrow(), vec![1, 2, 3]);
}

#[test]
fn test_stopping_all_children_closes_top_first() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    session.run(c).unwrap();
    let w1 = window(&mut session, "w1");
    let w2 = window(&mut session, "w2");
    let w3 = window(&mut session, "w3");
    for w in [w1, w2, w3] {
        session.run(w).unwrap();
    }
    session.iterate().unwrap();
    assert_eq!(session.current(), Some(w3));

    // What observers see at the first Iteration after the stop requests
    let snapshot = Rc::new(RefCell::new(None));
    let sink = snapshot.clone();
    session.subscribe(move |event, session| {
        if *event == SessionEvent::Iteration && sink.borrow().is_none() {
            let current = session.current();
            let running = current.is_some_and(|w| session.is_running(w));
            *sink.borrow_mut() = Some((current, running, session.overlapped_children()));
        }
    });
    let log = record(&mut session);

    session.request_stop(w3).unwrap();
    session.request_stop(w2).unwrap();
    session.request_stop(w1).unwrap();
    // Nothing moves before the iteration boundary
    assert_eq!(session.current(), Some(w3));
    assert_eq!(session.overlapped_children(), vec![w3, w2, w1]);

    session.iterate().unwrap();
    assert_eq!(
        *snapshot.borrow(),
        Some((Some(w3), false, vec![w3, w2, w1]))
    );
    assert_eq!(closed(&log.borrow()), vec![(w3, Some(c))]);

    session.run_until_idle().unwrap();
    let log = log.borrow();
    assert_eq!(
        closed(&log),
        vec![(w3, Some(c)), (w2, Some(c)), (w1, Some(c))]
    );
    assert_eq!(log.last(), Some(&SessionEvent::AllChildrenClosed));
    assert_eq!(
        log.iter()
            .filter(|e| **e == SessionEvent::AllChildrenClosed)
            .count(),
        1
    );
    assert_eq!(session.current(), Some(c));
    assert!(session.overlapped_children().is_empty());
}

#[test]
fn test_second_container_is_a_usage_error() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    let other = container(&mut session, "other");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.iterate().unwrap();

    let before = session.stack().windows();
    let err = session.run(other).unwrap_err();
    assert_eq!(
        err,
        Error::Stack(StackError::ContainerAlreadyActive {
            active: "c".into(),
            requested: "other".into(),
        })
    );
    assert_eq!(session.stack().windows(), before);
    assert_eq!(session.current(), Some(w1));
    assert_eq!(session.window_state(other), None);
}

#[test]
fn test_new_container_after_the_first_closes() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let other = container(&mut session, "other");
    session.run(c).unwrap();
    session.request_stop(c).unwrap();
    session.run_until_idle().unwrap();

    assert_eq!(session.window_state(c), Some(WindowState::Closed));
    assert!(session.run(other).is_ok());
}

#[test]
fn test_modal_close_notifies_invoker() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    let w2 = window(&mut session, "w2");
    let dialog = modal(&mut session, "dialog");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.run(w2).unwrap();
    session.iterate().unwrap();
    assert_eq!(session.current(), Some(w2));

    // Opened on behalf of w1 while w2 is current
    session.run_invoked_by(dialog, w1).unwrap();
    session.iterate().unwrap();
    let log = record(&mut session);

    session.request_stop(dialog).unwrap();
    session.iterate().unwrap();
    assert_eq!(closed(&log.borrow()), vec![(dialog, Some(w1))]);
    assert_eq!(session.current(), Some(w2));
}

#[test]
fn test_modal_close_defaults_to_current_and_can_be_redirected() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    let first = modal(&mut session, "first");
    let second = modal(&mut session, "second");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.iterate().unwrap();

    session.run(first).unwrap();
    session.iterate().unwrap();
    let log = record(&mut session);
    session.request_stop(first).unwrap();
    session.iterate().unwrap();

    session.run(second).unwrap();
    session.set_close_target(second, c).unwrap();
    session.iterate().unwrap();
    session.request_stop(second).unwrap();
    session.iterate().unwrap();

    assert_eq!(
        closed(&log.borrow()),
        vec![(first, Some(w1)), (second, Some(c))]
    );
}

#[test]
fn test_navigation_through_request_handle() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    let w2 = window(&mut session, "w2");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.run(w2).unwrap();
    session.iterate().unwrap();

    let handle = session.request_handle();
    let remote = handle.clone();
    std::thread::spawn(move || remote.move_next()).join().unwrap();
    session.iterate().unwrap();
    assert_eq!(session.current(), Some(w1));

    handle.move_to(w2);
    session.iterate().unwrap();
    assert_eq!(session.current(), Some(w2));

    handle.move_previous();
    session.iterate().unwrap();
    assert_eq!(session.current(), Some(w1));
}

#[test]
fn test_move_to_unknown_window_is_a_usage_error() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let stranger = window(&mut session, "stranger");
    session.run(c).unwrap();
    session.iterate().unwrap();

    assert_eq!(
        session.move_to(stranger),
        Err(Error::Stack(StackError::InvalidWindow(stranger)))
    );
}

#[test]
fn test_hidden_stopping_window_is_evicted_in_the_same_pass() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    let w2 = window(&mut session, "w2");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.run(w2).unwrap();
    session.iterate().unwrap();
    let log = record(&mut session);

    session.tree_mut().set_visible(w1, false).unwrap();
    session.request_stop(w1).unwrap();
    session.request_stop(w2).unwrap();
    session.iterate().unwrap();

    let log = log.borrow();
    assert_eq!(closed(&log), vec![(w2, Some(c)), (w1, Some(c))]);
    assert_eq!(log.last(), Some(&SessionEvent::AllChildrenClosed));
    assert_eq!(session.current(), Some(c));
}

#[test]
fn test_running_a_hidden_window_keeps_current() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    let hidden = window(&mut session, "hidden");
    let dialog = modal(&mut session, "dialog");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.iterate().unwrap();

    session.tree_mut().set_visible(hidden, false).unwrap();
    session.run(hidden).unwrap();
    assert_eq!(session.current(), Some(w1));

    // Run in the same tick: invoked by the visible window
    session.run(dialog).unwrap();
    session.iterate().unwrap();
    let log = record(&mut session);
    session.request_stop(dialog).unwrap();
    session.iterate().unwrap();

    assert_eq!(closed(&log.borrow()), vec![(dialog, Some(w1))]);
    assert_eq!(session.current(), Some(w1));
    assert_eq!(session.overlapped_children(), vec![hidden, w1]);
}

#[test]
fn test_windows_are_laid_out_against_the_screen() {
    let mut session = Session::default();
    let c = container(&mut session, "c");
    let w1 = window(&mut session, "w1");
    session.run(c).unwrap();
    session.run(w1).unwrap();
    session.iterate().unwrap();

    let frame = session.tree().frame(c).unwrap();
    assert_eq!((frame.width, frame.height), (80, 24));
    let frame = session.tree().frame(w1).unwrap();
    assert_eq!((frame.width, frame.height), (20, 5));
}
