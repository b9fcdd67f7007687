use yew::prelude::*;

use crate::model::PageId;

#[derive(Properties, PartialEq, Clone)]
pub struct ProgressHeaderProps {
    pub page: PageId,
    pub step_index: usize,
    pub step_count: usize,
    pub on_navigate: Callback<PageId>,
}

#[function_component]
pub fn ProgressHeader(props: &ProgressHeaderProps) -> Html {
    let tab_style = |current: bool| {
        format!(
            "padding:6px 12px; border-radius:999px; border:2px solid #0077CC; cursor:pointer; font-weight:600; {}",
            if current { "background:#0077CC; color:#fff;" } else { "background:#fff; color:#0077CC;" }
        )
    };
    let done = if props.step_count == 0 { 0.0 } else { (props.step_index + 1) as f64 / props.step_count as f64 };
    html! {
        <div id="top-bar" style="display:flex; flex-direction:column; gap:8px; padding:10px 16px; background:#F1F8FF; border-bottom:2px solid #0077CC;">
            <div style="display:flex; gap:8px; flex-wrap:wrap; align-items:center;">
                { for PageId::ORDER.iter().map(|&id| {
                    let cb = props.on_navigate.clone();
                    html! {
                        <button style={tab_style(id == props.page)} onclick={Callback::from(move |_| cb.emit(id))}>{ id.label() }</button>
                    }
                }) }
                <span style="margin-left:auto; font-variant-numeric:tabular-nums; color:#005999; font-weight:600;">
                    { format!("Step {} of {}", props.step_index + 1, props.step_count) }
                </span>
            </div>
            <div style="height:8px; background:#d6e8f7; border-radius:4px; overflow:hidden;">
                <div style={format!("height:100%; width:{:.0}%; background:#FFA500; transition:width 0.3s;", done * 100.0)}></div>
            </div>
        </div>
    }
}
