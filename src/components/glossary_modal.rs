use std::rc::Rc;

use yew::prelude::*;

use crate::model::GlossaryTerm;

#[derive(Properties, PartialEq, Clone)]
pub struct GlossaryModalProps {
    pub show: bool,
    pub terms: Rc<Vec<GlossaryTerm>>,
    /// Terms introduced by the current step, marked as new.
    pub new_terms: Vec<String>,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn GlossaryModal(props: &GlossaryModalProps) -> Html {
    if !props.show {
        return html! {};
    }
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.45); z-index:50;">
        <div style="background:#fff; border:2px solid #0077CC; border-radius:14px; padding:16px 20px; min-width:320px; max-width:480px; display:flex; flex-direction:column; gap:12px; color:#1d3557;">
            <div style="display:flex; justify-content:space-between; align-items:center;">
                <h3 style="margin:0; font-size:22px; color:#005999;">{"Glossary"}</h3>
                <button onclick={close_cb.clone()} style="padding:4px 10px;">{"Close"}</button>
            </div>
            <dl style="margin:0; display:flex; flex-direction:column; gap:10px;">
                { for props.terms.iter().map(|t| {
                    let is_new = props.new_terms.iter().any(|n| n == &t.term);
                    html! {
                        <div style={if is_new { "background:#FFF6D6; border-radius:8px; padding:6px 8px;" } else { "padding:6px 8px;" }}>
                            <dt style="font-weight:700; color:#0077CC;">
                                { t.term.clone() }
                                if is_new {
                                    <span style="margin-left:8px; font-size:11px; background:#FDB813; color:#fff; border-radius:6px; padding:1px 6px;">{"NEW"}</span>
                                }
                            </dt>
                            <dd style="margin:2px 0 0 0;">{ t.definition.clone() }</dd>
                        </div>
                    }
                }) }
            </dl>
            <button onclick={close_cb} style="align-self:flex-end;">{"Done"}</button>
        </div>
    </div>}
}
