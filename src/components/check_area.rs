use yew::prelude::*;

use crate::model::{Answer, Direction, InteractionKind};
use crate::session::SessionView;

#[derive(Properties, PartialEq, Clone)]
pub struct CheckAreaProps {
    pub view: SessionView,
    pub captions: bool,
    pub on_choose: Callback<Answer>,
    pub on_select_slot: Callback<u8>,
    pub on_keypad: Callback<u8>,
    pub on_check: Callback<()>,
    pub on_clear: Callback<()>,
}

const ANSWER_BTN: &str = "min-width:110px; padding:10px 18px; border-radius:12px; border:2px solid #0077CC; background:#fff; color:#005999; font-size:18px; font-weight:600; cursor:pointer;";
const KEY_BTN: &str = "width:46px; height:46px; border-radius:10px; border:2px solid #0077CC; background:#fff; color:#005999; font-size:18px; font-weight:700; cursor:pointer;";

fn answer_button(label: &str, answer: Answer, enabled: bool, cb: &Callback<Answer>) -> Html {
    let cb = cb.clone();
    html! {
        <button style={ANSWER_BTN} disabled={!enabled} onclick={Callback::from(move |_| cb.emit(answer.clone()))}>{ label.to_string() }</button>
    }
}

fn feedback_text(text: &str, correct: bool) -> String {
    match (text.is_empty(), correct) {
        (false, _) => text.to_string(),
        (true, true) => "Correct!".to_string(),
        (true, false) => "Not quite. Try again!".to_string(),
    }
}

#[function_component]
pub fn CheckArea(props: &CheckAreaProps) -> Html {
    let v = &props.view;
    let enabled = v.input_enabled;
    let inputs = match v.kind {
        InteractionKind::YesNo => html! {<>
            { answer_button("Yes", Answer::YesNo(true), enabled, &props.on_choose) }
            { answer_button("No", Answer::YesNo(false), enabled, &props.on_choose) }
        </>},
        InteractionKind::MultipleChoice => html! {<>
            { for v.choices.iter().map(|c| answer_button(&c.label, Answer::Choice(c.id.clone()), enabled, &props.on_choose)) }
        </>},
        InteractionKind::ClickArrow | InteractionKind::DragArrow if !v.canvas_arrows => html! {<>
            { answer_button("↻ Clockwise", Answer::Direction(Direction::Clockwise), enabled, &props.on_choose) }
            { answer_button("↺ Counterclockwise", Answer::Direction(Direction::Counterclockwise), enabled, &props.on_choose) }
        </>},
        InteractionKind::NumberInput => {
            let check = {
                let cb = props.on_check.clone();
                Callback::from(move |_| cb.emit(()))
            };
            let clear = {
                let cb = props.on_clear.clone();
                Callback::from(move |_| cb.emit(()))
            };
            html! {
                <div style="display:flex; flex-direction:column; gap:8px; align-items:center;">
                    <div style="display:flex; gap:6px;">
                        { for v.slots.iter().map(|&(slot, value)| {
                            let cb = props.on_select_slot.clone();
                            let selected = v.selected_slot == Some(slot);
                            let style = format!(
                                "{KEY_BTN} width:64px; {}",
                                if selected { "border-color:#FDB813; background:#FFF6D6;" } else { "" }
                            );
                            let label = value.map_or_else(|| "?".to_string(), |n| n.to_string());
                            html! { <button style={style} disabled={!enabled} title={format!("Box at {slot}")} onclick={Callback::from(move |_| cb.emit(slot))}>{ label }</button> }
                        }) }
                    </div>
                    <div style="display:grid; grid-template-columns:repeat(6, 46px); gap:6px;">
                        { for (1..=12u8).map(|n| {
                            let cb = props.on_keypad.clone();
                            html! { <button style={KEY_BTN} disabled={!enabled || v.selected_slot.is_none()} onclick={Callback::from(move |_| cb.emit(n))}>{ n }</button> }
                        }) }
                    </div>
                    <div style="display:flex; gap:8px;">
                        <button style={ANSWER_BTN} disabled={!enabled} onclick={clear}>{"Clear"}</button>
                        <button style={ANSWER_BTN} disabled={!enabled} onclick={check}>{"Check"}</button>
                    </div>
                </div>
            }
        }
        _ => html! {},
    };

    html! {
        <div style="display:flex; flex-direction:column; gap:10px; padding:14px 18px; min-width:280px; max-width:420px; color:#1d3557;">
            if let Some(caption) = &v.caption {
                <div>
                    <div style="font-size:13px; color:#0077CC; font-weight:600;">{ caption.counter.clone() }</div>
                    <h2 style="margin:2px 0 6px 0; color:#005999;">{ caption.title.clone() }</h2>
                    <p style="margin:0; font-size:18px;">{ caption.instruction.clone() }</p>
                </div>
            }
            if props.captions {
                if let Some(text) = &v.beat_text {
                    <p style="margin:0; font-size:17px; background:#F1F8FF; border-left:4px solid #0077CC; padding:6px 10px; border-radius:6px;">{ text.clone() }</p>
                }
            }
            if let Some((part, of)) = v.part {
                <div style="font-size:13px; color:#0077CC; font-weight:600;">{ format!("Part {part} of {of}") }</div>
            }
            if let Some(prompt) = &v.prompt {
                <p style="margin:0; font-size:20px; font-weight:700;">{ prompt.clone() }</p>
            }
            <div style="display:flex; gap:10px; flex-wrap:wrap;">{ inputs }</div>
            if let Some(fb) = &v.feedback {
                <div style={format!(
                    "padding:8px 12px; border-radius:10px; font-size:18px; font-weight:600; color:#fff; background:{};",
                    if fb.correct { "#5CB85C" } else { "#E63946" }
                )}>{ feedback_text(&fb.text, fb.correct) }</div>
            }
            if let Some(hint) = &v.hint {
                <div style="font-size:16px; color:#8a5a00; background:#FFF6D6; padding:6px 10px; border-radius:8px;">{ format!("Hint: {hint}") }</div>
            }
        </div>
    }
}
