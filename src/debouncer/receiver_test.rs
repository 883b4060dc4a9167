use std::any::TypeId;
use std::rc::Rc;

use super::receiver::ContextGuard;
use super::*;
use crate::Error;

struct Account {
    id: u32,
}
struct Session;

#[test]
fn clones_share_identity() {
    let receiver = Receiver::new(Rc::new(Account { id: 1 }));
    let clone = receiver.clone();

    assert!(receiver.same_instance(&clone));
    assert!(!receiver.same_instance(&Receiver::new(Rc::new(Account { id: 1 }))));
}

#[test]
fn downcast_recovers_concrete_type() {
    let receiver = Receiver::new(Rc::new(Account { id: 42 }));

    assert_eq!(receiver.downcast_ref::<Account>().map(|a| a.id), Some(42));
    assert!(receiver.downcast_ref::<Session>().is_none());
    assert_eq!(receiver.blueprint(), TypeId::of::<Account>());
    assert!(receiver.blueprint_name().ends_with("Account"));
}

#[test]
fn guard_binds_first_receiver_per_blueprint() {
    let mut guard = ContextGuard::default();
    let first = Receiver::new(Rc::new(Account { id: 1 }));
    let second = Receiver::new(Rc::new(Account { id: 2 }));
    let session = Receiver::new(Rc::new(Session));

    assert!(guard.admit(&first).is_ok());
    assert!(guard.admit(&first.clone()).is_ok());
    assert!(guard.admit(&session).is_ok());
    assert!(matches!(guard.admit(&second), Err(Error::ContextMismatch { .. })));

    // A rejection does not rebind the blueprint
    assert!(guard.admit(&first).is_ok());
}

#[test]
fn guard_does_not_keep_owner_alive() {
    let mut guard = ContextGuard::default();
    let object = Rc::new(Account { id: 1 });
    let receiver = Receiver::new(Rc::clone(&object));

    guard.admit(&receiver).unwrap();
    drop(receiver);

    assert_eq!(Rc::strong_count(&object), 1);
}
