//! Assessment scoring for the show-it page.

use std::collections::BTreeMap;

use log::info;

use crate::model::{Answer, LessonStep};

#[derive(Clone, Debug, PartialEq)]
pub struct AnswerRecord {
    pub question: usize,
    pub answer: Answer,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewItem {
    pub question: usize,
    pub prompt: String,
    pub given: Option<String>,
    pub expected: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreReport {
    pub score: usize,
    pub total: usize,
    pub passed: bool,
    /// Missed or unanswered questions, in question order.
    pub review: Vec<ReviewItem>,
}

impl ScoreReport {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.score * 100) as f64 / self.total as f64).round() as u32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssessmentScorer {
    pass_threshold: usize,
    log: Vec<AnswerRecord>,
}

impl AssessmentScorer {
    pub fn new(pass_threshold: usize) -> Self {
        Self { pass_threshold, log: Vec::new() }
    }

    pub fn record(&mut self, question: usize, answer: Answer, correct: bool) {
        self.log.push(AnswerRecord { question, answer, correct });
    }

    pub fn log(&self) -> &[AnswerRecord] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    /// Latest record per question; earlier attempts are superseded.
    fn final_answers(&self) -> BTreeMap<usize, &AnswerRecord> {
        self.log.iter().map(|r| (r.question, r)).collect()
    }

    /// Running count of questions whose latest answer is correct.
    pub fn score(&self) -> usize {
        self.final_answers().values().filter(|r| r.correct).count()
    }

    pub fn finalize(&self, questions: &[LessonStep]) -> ScoreReport {
        let answers = self.final_answers();
        let score = answers.values().filter(|r| r.correct).count();
        let review = questions
            .iter()
            .enumerate()
            .filter_map(|(i, step)| {
                let record = answers.get(&i);
                if record.is_some_and(|r| r.correct) {
                    return None;
                }
                let check = step.checks.first()?;
                Some(ReviewItem {
                    question: i,
                    prompt: check.prompt.clone(),
                    given: record.map(|r| r.answer.label(&step.choices)),
                    expected: check.expected.label(&step.choices),
                })
            })
            .collect();
        let report = ScoreReport {
            score,
            total: questions.len(),
            passed: score >= self.pass_threshold,
            review,
        };
        info!("assessment finalized: {}/{} passed={}", report.score, report.total, report.passed);
        report
    }
}
