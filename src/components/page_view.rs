use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};
use yew::prelude::*;

use super::{
    check_area::CheckArea, controls_panel::ControlsPanel, glossary_modal::GlossaryModal,
    intro_overlay::IntroOverlay, progress_header::ProgressHeader, results_overlay::ResultsOverlay,
};
use crate::error::LessonError;
use crate::model::{Answer, GlossaryTerm, LessonPage, PageId};
use crate::narration::{ClipOutcome, Ticket};
use crate::render::ClockLayout;
use crate::session::{Alarm, LessonSession, Move, SessionView};
use crate::settings::{Settings, Timing};
use crate::util::{canvas_point, digit_key};
use crate::web::audio::ClipSink;
use crate::web::timers::AlarmSink;
use crate::web::{WebAudio, WebScheduler, WebSession, paint};

type SessionCell = Rc<RefCell<Option<WebSession>>>;
type Hook = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

#[derive(Properties, PartialEq, Clone)]
pub struct PageViewProps {
    pub page: Rc<LessonPage>,
    pub glossary: Rc<Vec<GlossaryTerm>>,
    pub settings: Settings,
    pub on_navigate: Callback<PageId>,
    pub on_settings: Callback<Settings>,
}

fn moved(result: Result<Move, LessonError>) -> Option<Move> {
    match result {
        Ok(m) => Some(m),
        Err(LessonError::StepIncomplete { step }) => {
            debug!("step {step} is not finished yet");
            None
        }
        Err(e) => {
            warn!("navigation failed: {e}");
            None
        }
    }
}

/// Runs `op` on the live session, republishes the view, then follows a
/// page change if the operation produced one.
fn drive(
    session: &SessionCell,
    refresh: &Hook,
    navigate: &Callback<PageId>,
    op: impl FnOnce(&mut WebSession) -> Option<Move>,
) {
    let mv = session.borrow_mut().as_mut().and_then(op);
    let refresh = refresh.borrow().clone();
    if let Some(f) = refresh {
        f();
    }
    if let Some(Move::Page(page)) = mv {
        navigate.emit(page);
    }
}

/// Matches the canvas bitmap to its CSS size and lays the clock out in it.
fn fit_canvas(canvas: &HtmlCanvasElement) -> ClockLayout {
    let w = canvas.client_width().max(1) as u32;
    let h = canvas.client_height().max(1) as u32;
    canvas.set_width(w);
    canvas.set_height(h);
    ClockLayout::fit(w as f64, h as f64)
}

#[function_component(PageView)]
pub fn page_view(props: &PageViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let session: SessionCell = use_mut_ref(|| None::<WebSession>);
    let refresh_ref: Hook = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let view = use_state(|| None::<SessionView>);
    let show_intro = use_state(|| true);
    let show_glossary = use_state(|| false);
    let canvas_failed = use_state(|| false);

    // Main mount effect (session, events, frame loop)
    {
        let canvas_ref = canvas_ref.clone();
        let session = session.clone();
        let refresh_ref = refresh_ref.clone();
        let view = view.clone();
        let canvas_failed = canvas_failed.clone();
        let page = Rc::clone(&props.page);
        let navigate = props.on_navigate.clone();
        let muted = props.settings.muted;
        use_effect_with((), move |_| -> Box<dyn FnOnce()> {
            let (Some(window), Some(canvas)) = (web_sys::window(), canvas_ref.cast::<HtmlCanvasElement>()) else {
                error!("no window or canvas, {:?} cannot run", page.id);
                canvas_failed.set(true);
                return Box::new(|| ());
            };
            let ctx = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|o| o.dyn_into::<CanvasRenderingContext2d>().ok());
            if ctx.is_none() {
                error!("2d canvas context unavailable, the clock will not be drawn");
                canvas_failed.set(true);
            }
            let weak = Rc::downgrade(&session);

            let draw: Rc<dyn Fn()> = {
                let weak = weak.clone();
                let canvas = canvas.clone();
                Rc::new(move || {
                    let (Some(cell), Some(ctx)) = (weak.upgrade(), ctx.as_ref()) else {
                        return;
                    };
                    let Ok(guard) = cell.try_borrow() else {
                        return;
                    };
                    let Some(s) = guard.as_ref() else {
                        return;
                    };
                    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
                    if let Err(e) = paint::paint(ctx, &s.frame(), w, h) {
                        warn!("clock paint failed: {e:?}");
                    }
                })
            };

            // RAF loop, only scheduled while the hands are moving
            let raf_id: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
            let frame_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
            let request_frame: Rc<dyn Fn()> = {
                let raf_id = raf_id.clone();
                let frame_cb = frame_cb.clone();
                let window = window.clone();
                Rc::new(move || {
                    if raf_id.borrow().is_some() {
                        return;
                    }
                    let cb = frame_cb.borrow();
                    let Some(cb) = cb.as_ref() else {
                        return;
                    };
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        *raf_id.borrow_mut() = Some(id);
                    }
                })
            };
            *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new({
                let weak = weak.clone();
                let draw = draw.clone();
                let raf_id = raf_id.clone();
                let request_frame = request_frame.clone();
                move || {
                    *raf_id.borrow_mut() = None;
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let animating = cell
                        .try_borrow_mut()
                        .ok()
                        .and_then(|mut g| g.as_mut().map(|s| s.tick() && s.is_animating()))
                        .unwrap_or(false);
                    draw();
                    if animating {
                        request_frame();
                    }
                }
            }) as Box<dyn FnMut()>));

            let refresh: Rc<dyn Fn()> = {
                let weak = weak.clone();
                let draw = draw.clone();
                let request_frame = request_frame.clone();
                Rc::new(move || {
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let snapshot = cell
                        .try_borrow()
                        .ok()
                        .and_then(|g| g.as_ref().map(|s| (s.view(), s.is_animating())));
                    let Some((snapshot, animating)) = snapshot else {
                        return;
                    };
                    view.set(Some(snapshot));
                    draw();
                    if animating {
                        request_frame();
                    }
                })
            };

            let clip_sink: ClipSink = {
                let weak = weak.clone();
                let refresh = refresh.clone();
                Rc::new(move |ticket: Ticket, outcome: ClipOutcome| {
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    if let Some(s) = cell.borrow_mut().as_mut() {
                        s.on_clip_finished(ticket, outcome);
                    }
                    refresh();
                })
            };
            let alarm_sink: AlarmSink = {
                let weak = weak.clone();
                let refresh = refresh.clone();
                let navigate = navigate.clone();
                Rc::new(move |alarm: Alarm| {
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let mv = cell.borrow_mut().as_mut().and_then(|s| s.on_alarm(alarm));
                    refresh();
                    if let Some(Move::Page(page)) = mv {
                        navigate.emit(page);
                    }
                })
            };

            let mut lesson = LessonSession::new(
                Rc::clone(&page),
                WebAudio::new(clip_sink),
                WebScheduler::new(alarm_sink),
                Timing::default(),
            );
            lesson.set_layout(fit_canvas(&canvas));
            lesson.set_muted(muted);
            lesson.play_intro();
            *session.borrow_mut() = Some(lesson);
            *refresh_ref.borrow_mut() = Some(refresh.clone());
            refresh();

            let mousemove_cb = {
                let weak = weak.clone();
                let draw = draw.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let point = canvas_point(&canvas, e.client_x(), e.client_y());
                    let changed = cell.borrow_mut().as_mut().is_some_and(|s| s.pointer_moved(point));
                    if changed {
                        draw();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .ok();
            let mousedown_cb = {
                let weak = weak.clone();
                let refresh = refresh.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    if e.button() != 0 {
                        return;
                    }
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let point = canvas_point(&canvas, e.client_x(), e.client_y());
                    if let Some(s) = cell.borrow_mut().as_mut() {
                        s.click(point);
                    }
                    refresh();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .ok();
            // A single-finger tap is a click
            let touch_start_cb = {
                let weak = weak.clone();
                let refresh = refresh.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    if touches.length() != 1 {
                        return;
                    }
                    let Some(t0) = touches.item(0) else {
                        return;
                    };
                    e.prevent_default();
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let point = canvas_point(&canvas, t0.client_x(), t0.client_y());
                    if let Some(s) = cell.borrow_mut().as_mut() {
                        s.click(point);
                    }
                    refresh();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("touchstart", touch_start_cb.as_ref().unchecked_ref())
                .ok();
            let keydown_cb = {
                let weak = weak.clone();
                let refresh = refresh.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    let Some(cell) = weak.upgrade() else {
                        return;
                    };
                    let key = e.key();
                    let handled = {
                        let mut guard = cell.borrow_mut();
                        let Some(s) = guard.as_mut() else {
                            return;
                        };
                        match key.as_str() {
                            "Backspace" => {
                                s.clear_slot();
                                true
                            }
                            "Escape" => {
                                s.deselect_slot();
                                true
                            }
                            "Enter" => s.check_slots().is_some(),
                            other => match digit_key(other) {
                                Some(d) => {
                                    s.enter_digit(d);
                                    true
                                }
                                None => false,
                            },
                        }
                    };
                    if handled {
                        refresh();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();
            let resize_cb = {
                let weak = weak.clone();
                let draw = draw.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    let layout = fit_canvas(&canvas);
                    if let Some(cell) = weak.upgrade() {
                        if let Some(s) = cell.borrow_mut().as_mut() {
                            s.set_layout(layout);
                        }
                    }
                    draw();
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();
            let blur_cb = {
                let weak = weak.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    if let Some(cell) = weak.upgrade() {
                        if let Some(s) = cell.borrow_mut().as_mut() {
                            s.pause_narration();
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("blur", blur_cb.as_ref().unchecked_ref())
                .ok();

            // Cleanup
            Box::new(move || {
                let _ = canvas.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "keydown",
                    keydown_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "blur",
                    blur_cb.as_ref().unchecked_ref(),
                );
                if let Some(id) = raf_id.borrow_mut().take() {
                    let _ = window.cancel_animation_frame(id);
                }
                *frame_cb.borrow_mut() = None;
                *refresh_ref.borrow_mut() = None;
                // Dropping the session silences audio and clears its timers.
                let finished = session.borrow_mut().take();
                if let Some(mut s) = finished {
                    s.leave();
                }
                drop((mousemove_cb, mousedown_cb, touch_start_cb, keydown_cb, resize_cb, blur_cb));
            })
        });
    }
    // Mute follows the persisted setting
    {
        let session = session.clone();
        let refresh_ref = refresh_ref.clone();
        let navigate = props.on_navigate.clone();
        use_effect_with(props.settings.muted, move |muted| {
            let muted = *muted;
            drive(&session, &refresh_ref, &navigate, |s| {
                if s.is_muted() != muted {
                    s.set_muted(muted);
                }
                None
            });
            || ()
        });
    }

    let op = |f: fn(&mut WebSession) -> Option<Move>| -> Callback<()> {
        let session = session.clone();
        let refresh = refresh_ref.clone();
        let navigate = props.on_navigate.clone();
        Callback::from(move |()| drive(&session, &refresh, &navigate, f))
    };
    let on_prev = op(|s| moved(s.retreat()));
    let on_next = op(|s| moved(s.advance()));
    let on_skip = op(|s| moved(s.skip()));
    let on_retry = op(|s| moved(s.retry()));
    let on_restart = op(|s| moved(s.restart()));
    let on_replay = op(|s| {
        s.replay_narration();
        None
    });
    let on_check = op(|s| {
        s.check_slots();
        None
    });
    let on_clear = op(|s| {
        s.clear_slot();
        None
    });
    let start_page = op(|s| {
        if let Err(e) = s.load_step(0) {
            error!("could not start page: {e}");
        }
        None
    });

    let on_start: Callback<()> = {
        let show_intro = show_intro.clone();
        Callback::from(move |()| {
            show_intro.set(false);
            start_page.emit(());
        })
    };
    let on_choose: Callback<Answer> = {
        let session = session.clone();
        let refresh = refresh_ref.clone();
        let navigate = props.on_navigate.clone();
        Callback::from(move |answer: Answer| {
            drive(&session, &refresh, &navigate, move |s| {
                s.choose(answer);
                None
            })
        })
    };
    let on_select_slot: Callback<u8> = {
        let session = session.clone();
        let refresh = refresh_ref.clone();
        let navigate = props.on_navigate.clone();
        Callback::from(move |slot: u8| {
            drive(&session, &refresh, &navigate, move |s| {
                s.select_slot(slot);
                None
            })
        })
    };
    let on_keypad: Callback<u8> = {
        let session = session.clone();
        let refresh = refresh_ref.clone();
        let navigate = props.on_navigate.clone();
        Callback::from(move |n: u8| {
            drive(&session, &refresh, &navigate, move |s| {
                s.enter_number(n);
                None
            })
        })
    };

    let settings = props.settings;
    let toggle_mute: Callback<()> = {
        let cb = props.on_settings.clone();
        Callback::from(move |()| cb.emit(Settings { muted: !settings.muted, ..settings }))
    };
    let toggle_captions: Callback<()> = {
        let cb = props.on_settings.clone();
        Callback::from(move |()| cb.emit(Settings { captions: !settings.captions, ..settings }))
    };
    let open_glossary: Callback<()> = {
        let show_glossary = show_glossary.clone();
        Callback::from(move |()| show_glossary.set(true))
    };
    let close_glossary: Callback<()> = {
        let show_glossary = show_glossary.clone();
        Callback::from(move |()| show_glossary.set(false))
    };

    let page = &props.page;
    let current = (*view).clone();
    let (step_index, step_count) = current
        .as_ref()
        .map_or((0, page.steps.len()), |v| (v.step_index, v.step_count));
    let can_advance = current.as_ref().is_some_and(|v| v.can_advance);
    let last_step = step_index + 1 == step_count;
    let next_label = if page.is_assessment() && last_step { "Finish" } else { "Next" };
    let new_terms = current.as_ref().map(|v| v.new_terms.clone()).unwrap_or_default();
    let report = current.as_ref().and_then(|v| v.report.clone());
    let start_label = if page.id == PageId::Home { "Start the lesson" } else { "Let's go!" };

    html! {<div style="position:relative; width:100vw; height:100vh; display:flex; flex-direction:column; background:#FFFFFF; font-family:'Comic Sans MS', 'Trebuchet MS', sans-serif;">
        <ProgressHeader page={page.id} step_index={step_index} step_count={step_count} on_navigate={props.on_navigate.clone()} />
        <div style="flex:1; display:flex; min-height:0; flex-wrap:wrap;">
            <div style="flex:1; position:relative; min-width:280px; min-height:280px;">
                <canvas ref={canvas_ref.clone()} id="clock-canvas" style="display:block; width:100%; height:100%; touch-action:none;"></canvas>
                if *canvas_failed {
                    <div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; font-size:18px; color:#E63946;">
                        {"Sorry, this interactive element could not be loaded."}
                    </div>
                }
            </div>
            if let Some(v) = current {
                <CheckArea view={v} captions={settings.captions} on_choose={on_choose} on_select_slot={on_select_slot} on_keypad={on_keypad} on_check={on_check} on_clear={on_clear} />
            }
        </div>
        <ControlsPanel
            can_advance={can_advance}
            next_label={next_label.to_string()}
            muted={settings.muted}
            captions={settings.captions}
            on_prev={on_prev}
            on_next={on_next}
            on_skip={on_skip}
            on_retry={on_retry}
            on_replay={on_replay}
            on_toggle_mute={toggle_mute}
            on_toggle_captions={toggle_captions}
            on_show_help={open_glossary}
        />
        <IntroOverlay show={*show_intro} title={page.title.clone()} intro={page.intro.clone()} start_label={start_label.to_string()} on_start={on_start} />
        <ResultsOverlay report={report} restart={on_restart} on_navigate={props.on_navigate.clone()} />
        <GlossaryModal show={*show_glossary} terms={props.glossary.clone()} new_terms={new_terms} on_close={close_glossary} />
    </div>}
}
