use std::rc::Rc;

use log::error;
use yew::prelude::*;

use super::page_view::PageView;
use crate::content;
use crate::model::{GlossaryTerm, LessonPage, PageId};
use crate::settings::Settings;
use crate::web::storage;

/// Lesson content shared by every page view.
struct Loaded {
    glossary: Rc<Vec<GlossaryTerm>>,
    pages: Vec<Rc<LessonPage>>,
}

fn fallback(message: &str) -> Html {
    html! {
        <div style="display:flex; align-items:center; justify-content:center; height:100vh; font-size:20px; color:#E63946; font-family:sans-serif;">
            { message.to_string() }
        </div>
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let lesson = use_memo((), |_| {
        content::load_lesson().map(|l| Loaded {
            glossary: Rc::new(l.glossary),
            pages: l.pages.into_iter().map(Rc::new).collect(),
        })
    });
    let page = use_state(|| PageId::Home);
    let settings = use_state(storage::load_settings);

    // Persist settings changes
    use_effect_with(*settings, move |s| {
        storage::save_settings(s);
        || ()
    });

    let loaded = match &*lesson {
        Ok(l) => l,
        Err(e) => {
            error!("lesson content rejected: {e}");
            return fallback("Sorry, the lesson could not be loaded.");
        }
    };
    let Some(current) = loaded.pages.iter().find(|p| p.id == *page).cloned() else {
        return fallback("Sorry, this page is missing.");
    };

    let on_navigate = {
        let page = page.clone();
        Callback::from(move |id: PageId| page.set(id))
    };
    let on_settings = {
        let settings = settings.clone();
        Callback::from(move |s: Settings| settings.set(s))
    };

    html! {
        <PageView
            key={page.label()}
            page={current}
            glossary={loaded.glossary.clone()}
            settings={*settings}
            on_navigate={on_navigate}
            on_settings={on_settings}
        />
    }
}
