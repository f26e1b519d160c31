//! Prompt templates for the upstream model, one builder per operation.
//!
//! Builders take already-validated fields; no decision logic lives here.

use crate::domain::model::Dimension;

/// System prompt shared by every operation
pub const SYSTEM_PROMPT: &str = "You are an experienced permaculture designer and master gardener. \
Give practical, specific advice grounded in organic and regenerative practice. \
Prefer low-input, locally adapted solutions, explain the reasoning briefly, \
and use short headings and bullet lists so answers are easy to scan.";

pub struct ConsultPrompt<'a> {
    pub question: &'a str,
    pub context: Option<&'a str>,
}

pub struct PlanPrompt<'a> {
    pub space_size: &'a str,
    pub soil_type: &'a str,
    pub goals: &'a str,
    pub location: &'a str,
}

pub struct DiagnosePrompt<'a> {
    pub plant: &'a str,
    pub problem: &'a str,
    pub timeframe: &'a str,
    pub location: &'a str,
}

pub struct GridPlanPrompt<'a> {
    pub width: &'a Dimension,
    pub length: &'a Dimension,
    pub plants: &'a str,
    pub location: Option<&'a str>,
    pub zone: Option<&'a str>,
    pub soil_type: Option<&'a str>,
}

pub fn build_consult_prompt(p: &ConsultPrompt<'_>) -> String {
    let mut prompt = format!("A gardener asks:\n\n{}\n", p.question.trim());
    if let Some(context) = non_empty(p.context) {
        prompt.push_str(&format!("\nAdditional context from the gardener:\n{}\n", context));
    }
    prompt.push_str(
        "\nAnswer the question directly, then add any permaculture principles or \
         companion-planting tips that apply.",
    );
    prompt
}

pub fn build_plan_prompt(p: &PlanPrompt<'_>) -> String {
    format!(
        "Design a permaculture garden plan.\n\n\
         Space available: {}\n\
         Soil type: {}\n\
         Location: {}\n\
         Goals: {}\n\n\
         Include:\n\
         1. Zone layout and placement of key elements\n\
         2. Recommended plants and guilds for this soil and climate\n\
         3. Soil building and water management steps\n\
         4. A seasonal planting timeline\n\
         5. A realistic first-year action list",
        p.space_size.trim(),
        p.soil_type.trim(),
        p.location.trim(),
        p.goals.trim(),
    )
}

pub fn build_diagnose_prompt(p: &DiagnosePrompt<'_>) -> String {
    format!(
        "Help diagnose a plant health problem.\n\n\
         Plant: {}\n\
         Symptoms: {}\n\
         Noticed for: {}\n\
         Location: {}\n\n\
         List the most likely causes in order of probability, how to confirm each one, \
         and organic treatments. Finish with prevention tips for next season.",
        p.plant.trim(),
        p.problem.trim(),
        p.timeframe.trim(),
        p.location.trim(),
    )
}

pub fn build_grid_plan_prompt(p: &GridPlanPrompt<'_>) -> String {
    let mut prompt = format!(
        "Lay out a planting grid for a {} by {} foot plot using one-foot squares.\n\n\
         Plants wanted: {}\n",
        p.width,
        p.length,
        p.plants.trim(),
    );

    // 選填欄位只在有值時加入
    if let Some(location) = non_empty(p.location) {
        prompt.push_str(&format!("Location: {}\n", location));
    }
    if let Some(zone) = non_empty(p.zone) {
        prompt.push_str(&format!("Hardiness zone: {}\n", zone));
    }
    if let Some(soil_type) = non_empty(p.soil_type) {
        prompt.push_str(&format!("Soil type: {}\n", soil_type));
    }

    prompt.push_str(
        "\nReturn the grid row by row using short plant abbreviations with a legend, \
         keep tall plants on the north side, group companions together, \
         and note spacing and succession plantings.",
    );
    prompt
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
