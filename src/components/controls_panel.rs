use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub can_advance: bool,
    pub next_label: String,
    pub muted: bool,
    pub captions: bool,
    pub on_prev: Callback<()>,
    pub on_next: Callback<()>,
    pub on_skip: Callback<()>,
    pub on_retry: Callback<()>,
    pub on_replay: Callback<()>,
    pub on_toggle_mute: Callback<()>,
    pub on_toggle_captions: Callback<()>,
    pub on_show_help: Callback<()>,
}

fn unit(cb: &Callback<()>) -> Callback<MouseEvent> {
    let cb = cb.clone();
    Callback::from(move |_| cb.emit(()))
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let btn = "padding:8px 14px; border-radius:10px; border:2px solid #0077CC; background:#fff; color:#005999; font-size:16px; cursor:pointer;";
    let next_style = if props.can_advance {
        "padding:8px 18px; border-radius:10px; border:none; background:#FFA500; color:#fff; font-size:16px; font-weight:700; cursor:pointer;"
    } else {
        "padding:8px 18px; border-radius:10px; border:none; background:#ccc; color:#fff; font-size:16px; font-weight:700; cursor:not-allowed;"
    };
    html! {<div style="display:flex; gap:8px; flex-wrap:wrap; align-items:center; justify-content:space-between; padding:10px 16px; background:#F1F8FF; border-top:2px solid #0077CC;">
        <div style="display:flex; gap:8px;">
            <button style={btn} onclick={unit(&props.on_replay)} title="Replay narration">{"🔊 Replay"}</button>
            <button style={btn} onclick={unit(&props.on_toggle_mute)}>{ if props.muted { "🔇 Sound off" } else { "🔈 Sound on" } }</button>
            <button style={btn} onclick={unit(&props.on_toggle_captions)}>{ if props.captions { "CC on" } else { "CC off" } }</button>
            <button style={btn} onclick={unit(&props.on_show_help)}>{"📖 Glossary"}</button>
        </div>
        <div style="display:flex; gap:8px;">
            <button style={btn} onclick={unit(&props.on_prev)}>{"◀ Back"}</button>
            <button style={btn} onclick={unit(&props.on_retry)}>{"Try again"}</button>
            <button style={btn} onclick={unit(&props.on_skip)}>{"Skip"}</button>
            <button style={next_style} disabled={!props.can_advance} onclick={unit(&props.on_next)}>{ format!("{} ▶", props.next_label) }</button>
        </div>
    </div>}
}
