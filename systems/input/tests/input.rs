use savings_arcade_core::{InputEvent, Intent, Key, PointerButton, PointerId, Steering};
use savings_arcade_system_input::InputController;

fn attached() -> InputController {
    let mut controller = InputController::new();
    controller.attach();
    controller
}

#[test]
fn held_keys_persist_until_released() {
    let mut controller = attached();
    controller.handle(InputEvent::KeyDown(Key::ArrowLeft));
    controller.handle(InputEvent::KeyDown(Key::Space));

    let intent = controller.intent();
    assert!(intent.left && intent.fire);
    assert_eq!(intent.steering(), Steering::Left);

    controller.handle(InputEvent::KeyUp(Key::ArrowLeft));
    let intent = controller.intent();
    assert!(!intent.left);
    assert!(intent.fire);
}

#[test]
fn alternate_keys_share_an_action() {
    let mut controller = attached();
    controller.handle(InputEvent::KeyDown(Key::ArrowRight));
    controller.handle(InputEvent::KeyDown(Key::D));
    controller.handle(InputEvent::KeyUp(Key::ArrowRight));

    assert!(controller.intent().right, "D is still held");

    controller.handle(InputEvent::KeyUp(Key::D));
    assert!(!controller.intent().right);
}

#[test]
fn bomb_is_one_shot_until_consumed() {
    let mut controller = attached();
    controller.handle(InputEvent::KeyDown(Key::B));
    controller.handle(InputEvent::KeyUp(Key::B));
    assert!(controller.intent().bomb, "release does not cancel the request");

    assert!(controller.intent_mut().take_bomb());
    assert!(!controller.intent().bomb);
}

#[test]
fn pointers_steer_and_fire_by_zone() {
    let mut controller = attached();
    let touch = PointerId::new(3);
    controller.handle(InputEvent::PointerDown {
        pointer: touch,
        x: 0.1,
        button: PointerButton::Primary,
    });
    assert!(controller.intent().left);

    controller.handle(InputEvent::PointerMoved {
        pointer: touch,
        x: 0.5,
    });
    let intent = controller.intent();
    assert!(!intent.left && intent.fire);

    controller.handle(InputEvent::PointerUp { pointer: touch });
    assert_eq!(controller.intent(), Intent::default());
}

#[test]
fn secondary_button_requests_a_bomb() {
    let mut controller = attached();
    controller.handle(InputEvent::PointerDown {
        pointer: PointerId::MOUSE,
        x: 0.5,
        button: PointerButton::Secondary,
    });
    let intent = controller.intent();
    assert!(intent.bomb);
    assert!(!intent.fire);
}

#[test]
fn focus_loss_releases_held_inputs_but_keeps_bomb() {
    let mut controller = attached();
    controller.handle(InputEvent::KeyDown(Key::Space));
    controller.handle(InputEvent::KeyDown(Key::B));
    controller.handle(InputEvent::FocusLost);

    let intent = controller.intent();
    assert!(!intent.fire);
    assert!(intent.bomb);
}

#[test]
fn detach_clears_everything_and_stops_listening() {
    let mut controller = attached();
    controller.handle(InputEvent::KeyDown(Key::Space));
    controller.handle(InputEvent::KeyDown(Key::B));
    controller.detach();

    assert!(!controller.is_attached());
    assert_eq!(controller.intent(), Intent::default());

    controller.handle(InputEvent::KeyDown(Key::ArrowLeft));
    assert_eq!(controller.intent(), Intent::default());
}
