use yew::prelude::*;

use crate::model::PageId;
use crate::scoring::ScoreReport;
use crate::util::score_line;

#[derive(Properties, PartialEq, Clone)]
pub struct ResultsOverlayProps {
    pub report: Option<ScoreReport>,
    pub restart: Callback<()>,
    pub on_navigate: Callback<PageId>,
}

#[function_component]
pub fn ResultsOverlay(props: &ResultsOverlayProps) -> Html {
    let Some(report) = &props.report else {
        return html! {};
    };
    let restart_btn = {
        let cb = props.restart.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let go = |page: PageId| {
        let cb = props.on_navigate.clone();
        Callback::from(move |_| cb.emit(page))
    };
    let (verdict, colour) = if report.passed { ("PASS", "#5CB85C") } else { ("NEEDS REVIEW", "#E63946") };
    html! {
        <div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,40,80,0.35); z-index:45;">
            <div style={format!("background:#fff; border:3px solid {colour}; padding:24px 32px; border-radius:16px; text-align:center; min-width:320px; max-width:520px; color:#1d3557;")}>
                <h2 style={format!("margin:0 0 8px 0; color:{colour};")}>{ verdict }</h2>
                <p style="margin:4px 0; font-size:22px; font-weight:700;">{ score_line(report.score, report.total, report.percent()) }</p>
                if !report.review.is_empty() {
                    <div style="text-align:left; margin-top:12px;">
                        <div style="font-weight:700; margin-bottom:6px;">{"Let's look at these again:"}</div>
                        <ul style="margin:0 0 0 18px; padding:0; display:flex; flex-direction:column; gap:6px;">
                            { for report.review.iter().map(|item| html! {
                                <li>
                                    <div>{ format!("Question {}: {}", item.question + 1, item.prompt) }</div>
                                    <div style="font-size:14px; opacity:0.8;">
                                        { format!("Your answer: {} · Answer: {}", item.given.as_deref().unwrap_or("(none)"), item.expected) }
                                    </div>
                                </li>
                            }) }
                        </ul>
                    </div>
                }
                if !report.passed {
                    <div style="margin-top:14px; display:flex; gap:10px; justify-content:center;">
                        <button onclick={go(PageId::LearnIt)}>{"Review Learn It"}</button>
                        <button onclick={go(PageId::TryIt)}>{"Practice Try It"}</button>
                    </div>
                }
                <div style="margin-top:16px; display:flex; gap:12px; justify-content:center;">
                    <button onclick={restart_btn}>{"Try Again"}</button>
                    <button onclick={go(PageId::Home)}>{"Finish"}</button>
                </div>
            </div>
        </div>
    }
}
