//! Report prompt template.
//!
//! The generation model receives the dermoscopic image alongside this
//! prompt; the fixed four-section Markdown outline is what the renderers
//! downstream are built to translate.

use super::ReportContext;

/// Build the report-generation prompt for one classified image.
pub fn build_report_prompt(ctx: &ReportContext) -> String {
    format!(
        r#"ACT AS: An expert Dermatologist and Medical Consultant.
CONTEXT: A patient has uploaded a dermoscopic image for skin lesion analysis.
AI MODEL RESULT: The local analysis model has classified the lesion as '{prediction}' with a confidence of {confidence}%.

TASK: Generate a comprehensive medical analysis report in {language}.

REPORT STRUCTURE (Use Markdown):
1. ## Patient Report Summary
   - State the classification result clearly.
   - Explain what '{prediction}' generally means in simple terms.
2. ## Clinical Observations
   - Based on the image analysis, describe what clinical features a specialist would look for (e.g., symmetry, borders, color variations).
3. ## Recommendations & Next Steps
   - Provide clear actionable advice (e.g., "Monitor for changes using the ABCDE rule", "Consult a specialist for a biopsy", "Annual skin checks").
4. ## Important Disclaimer
   - Include a standard medical disclaimer: This is an AI-generated report for educational purposes and NOT a final diagnosis.

TONE: Professional, supportive, and clinical.
FORMATTING: Use clear headings, bullet points, and bold text for emphasis."#,
        prediction = ctx.prediction,
        confidence = ctx.confidence_percent(),
        language = ctx.language,
    )
}
