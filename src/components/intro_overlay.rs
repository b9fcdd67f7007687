use yew::prelude::*;

use crate::model::Intro;

#[derive(Properties, PartialEq, Clone)]
pub struct IntroOverlayProps {
    pub show: bool,
    pub title: String,
    pub intro: Intro,
    pub start_label: String,
    pub on_start: Callback<()>,
}

#[function_component(IntroOverlay)]
pub fn intro_overlay(props: &IntroOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let start_btn = {
        let cb = props.on_start.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let heading = if props.intro.heading.is_empty() { props.title.clone() } else { props.intro.heading.clone() };
    html! {
        <div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,40,80,0.35); z-index:40;">
            <div style="background:#FFFFFF; border:3px solid #0077CC; padding:28px 36px; border-radius:18px; max-width:520px; width:90%; box-shadow:0 6px 18px rgba(0,0,0,0.25); font-size:18px; line-height:1.5; color:#1d3557;">
                <div style="font-size:13px; text-transform:uppercase; letter-spacing:1px; color:#0077CC; text-align:center;">{ props.title.clone() }</div>
                <h2 style="margin:4px 0 14px 0; font-size:28px; color:#005999; text-align:center;">{ heading }</h2>
                if !props.intro.points.is_empty() {
                    <ul style="margin:0 0 16px 22px; padding:0; display:flex; flex-direction:column; gap:6px;">
                        { for props.intro.points.iter().map(|p| html!{ <li>{ p.clone() }</li> }) }
                    </ul>
                }
                <div style="display:flex; justify-content:center;">
                    <button onclick={start_btn} style="font-size:20px; padding:10px 28px; border-radius:12px; background:#FFA500; border:none; color:#fff; cursor:pointer;">{ props.start_label.clone() }</button>
                </div>
            </div>
        </div>
    }
}
