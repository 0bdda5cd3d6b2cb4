//! DrawingML shape emission onto a slide part.
//!
//! A `SlideBuilder` accumulates shape XML for one slide and flushes it into
//! the package in a single append, keeping shape ids contiguous with
//! whatever the template already has on that slide.

use crate::errors::AppResult;
use crate::pptx::PptxPackage;
use crate::pptx::xml::esc;

pub const EMU_PER_CM: f64 = 360_000.0;

pub fn cm(v: f64) -> i64 {
    (v * EMU_PER_CM).round() as i64
}

pub fn pt_to_emu(v: f64) -> i64 {
    (v * 12_700.0).round() as i64
}

/// Shape bounds in EMUs.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub size_pt: u32,
    /// Font color as RRGGBB; inherits the theme color when absent.
    pub color: Option<String>,
    /// Relationship id of an external hyperlink on this run.
    pub hyperlink: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>, size_pt: u32) -> Self {
        Self {
            text: text.into(),
            size_pt,
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn colored(mut self, rrggbb: &str) -> Self {
        self.color = Some(rrggbb.to_string());
        self
    }

    pub fn linked(mut self, rid: String) -> Self {
        self.hyperlink = Some(rid);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn of(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    fn to_xml(&self) -> String {
        let mut out = String::from("<a:p><a:pPr algn=\"l\"/>");
        for run in &self.runs {
            out.push_str(&run_xml(run));
        }
        out.push_str("</a:p>");
        out
    }
}

fn run_xml(run: &TextRun) -> String {
    let mut rpr = format!(
        r#"<a:rPr lang="fr-FR" sz="{}" b="{}" dirty="0">"#,
        run.size_pt * 100,
        u8::from(run.bold)
    );
    if let Some(color) = &run.color {
        rpr.push_str(&format!(
            r#"<a:solidFill><a:srgbClr val="{color}"/></a:solidFill>"#
        ));
    }
    if let Some(rid) = &run.hyperlink {
        rpr.push_str(&format!(r#"<a:hlinkClick r:id="{rid}"/>"#));
    }
    rpr.push_str("</a:rPr>");
    format!("<a:r>{rpr}<a:t>{}</a:t></a:r>", esc(&run.text))
}

fn body_xml(paragraphs: &[Paragraph]) -> String {
    let mut out = String::from(
        r#"<p:txBody><a:bodyPr wrap="square" lIns="36000" tIns="18000" rIns="36000" bIns="18000"/><a:lstStyle/>"#,
    );
    if paragraphs.is_empty() {
        out.push_str("<a:p/>");
    } else {
        for p in paragraphs {
            out.push_str(&p.to_xml());
        }
    }
    out.push_str("</p:txBody>");
    out
}

fn xfrm_xml(rect: Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )
}

pub struct SlideBuilder<'a> {
    pkg: &'a mut PptxPackage,
    part: String,
    next_id: u32,
    fragment: String,
}

impl<'a> SlideBuilder<'a> {
    pub fn new(pkg: &'a mut PptxPackage, part: impl Into<String>) -> Self {
        let part = part.into();
        let next_id = pkg.max_shape_id(&part) + 1;
        Self {
            pkg,
            part,
            next_id,
            fragment: String::new(),
        }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register an external hyperlink for use in a later run.
    pub fn hyperlink(&mut self, url: &str) -> AppResult<String> {
        self.pkg.add_hyperlink_rel(&self.part, url)
    }

    /// Rounded rectangle with solid fill, thin black outline and text.
    pub fn rounded_rect(
        &mut self,
        rect: Rect,
        fill: &str,
        paragraphs: &[Paragraph],
    ) -> AppResult<()> {
        let id = self.take_id();
        let line_width = pt_to_emu(0.75);
        self.fragment.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="box {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="roundRect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{fill}"/></a:solidFill><a:ln w="{line_width}"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln></p:spPr>{body}</p:sp>"#,
            xfrm = xfrm_xml(rect),
            body = body_xml(paragraphs),
        ));
        Ok(())
    }

    /// Borderless filled rectangle (legend swatches, bar-chart bars).
    pub fn solid_rect(&mut self, rect: Rect, fill: &str) {
        let id = self.take_id();
        self.fragment.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="rect {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{fill}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#,
            xfrm = xfrm_xml(rect),
        ));
    }

    /// Pie-slice preset geometry. Angles are in degrees, measured clockwise
    /// from 3 o'clock, which is how the `pie` preset expects its adjust
    /// values (in 1/60000 degree units).
    pub fn pie_wedge(&mut self, rect: Rect, start_deg: f64, end_deg: f64, fill: &str) {
        let id = self.take_id();
        let adj1 = (start_deg.rem_euclid(360.0) * 60_000.0).round() as i64;
        let adj2 = (end_deg.rem_euclid(360.0) * 60_000.0).round() as i64;
        self.fragment.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="wedge {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="pie"><a:avLst><a:gd name="adj1" fmla="val {adj1}"/><a:gd name="adj2" fmla="val {adj2}"/></a:avLst></a:prstGeom><a:solidFill><a:srgbClr val="{fill}"/></a:solidFill><a:ln w="9525"><a:solidFill><a:srgbClr val="FFFFFF"/></a:solidFill></a:ln></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#,
            xfrm = xfrm_xml(rect),
        ));
    }

    /// Plain text box without fill or outline.
    pub fn textbox(&mut self, rect: Rect, paragraphs: &[Paragraph]) {
        let id = self.take_id();
        self.fragment.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="text {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>{body}</p:sp>"#,
            xfrm = xfrm_xml(rect),
            body = body_xml(paragraphs),
        ));
    }

    /// Title as a bold textbox at the top of the slide. Templates keep their
    /// placeholder styling for existing slides; generated slides get this.
    pub fn title(&mut self, slide_width: i64, text: &str) {
        let rect = Rect {
            x: cm(1.0),
            y: cm(0.8),
            cx: slide_width - cm(2.0),
            cy: cm(1.5),
        };
        let para = Paragraph::of(vec![TextRun::plain(text, 24).bold()]);
        self.textbox(rect, &[para]);
    }

    /// DrawingML table. `cells` is row-major; the first row is styled as a
    /// header band.
    pub fn table(
        &mut self,
        origin_x: i64,
        origin_y: i64,
        col_widths: &[i64],
        row_height: i64,
        cells: &[Vec<Vec<Paragraph>>],
    ) {
        let id = self.take_id();
        let total_width: i64 = col_widths.iter().sum();
        let total_height = row_height * cells.len() as i64;

        let mut tbl = String::from(
            r#"<a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#,
        );
        for w in col_widths {
            tbl.push_str(&format!(r#"<a:gridCol w="{w}"/>"#));
        }
        tbl.push_str("</a:tblGrid>");

        for row in cells {
            tbl.push_str(&format!(r#"<a:tr h="{row_height}">"#));
            for cell in row {
                tbl.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>");
                if cell.is_empty() {
                    tbl.push_str("<a:p/>");
                } else {
                    for p in cell {
                        tbl.push_str(&p.to_xml());
                    }
                }
                tbl.push_str(r#"</a:txBody><a:tcPr marT="18000" marB="18000"/></a:tc>"#);
            }
            tbl.push_str("</a:tr>");
        }
        tbl.push_str("</a:tbl>");

        self.fragment.push_str(&format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="table {id}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{origin_x}" y="{origin_y}"/><a:ext cx="{total_width}" cy="{total_height}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">{tbl}</a:graphicData></a:graphic></p:graphicFrame>"#,
        ));
    }

    /// Flush accumulated shapes into the slide part.
    pub fn commit(self) -> AppResult<()> {
        if self.fragment.is_empty() {
            return Ok(());
        }
        self.pkg.append_shapes(&self.part, &self.fragment)
    }
}
