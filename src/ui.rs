use chrono::NaiveDate;

pub fn render_index(row_count: usize, max_date: Option<NaiveDate>) -> String {
    let coverage = match max_date {
        Some(date) => format!("{row_count} transactions through {date}"),
        None => "no transactions loaded".to_string(),
    };
    INDEX_HTML.replace("{{COVERAGE}}", &coverage)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Sales Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f6f4ee;
      --bg-2: #d9e5df;
      --ink: #26302c;
      --accent: #2d7a4b;
      --accent-2: #2f4858;
      --accent-3: #c77d2f;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e9f0ea 60%, #f4f1ea 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f655f;
      font-size: 1rem;
    }

    .layout {
      display: grid;
      grid-template-columns: 260px 1fr;
      gap: 24px;
      align-items: start;
    }

    .sidebar {
      background: white;
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 18px;
    }

    .sidebar h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .field {
      display: grid;
      gap: 6px;
    }

    .field label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #84887f;
    }

    .field select,
    .field input {
      font: inherit;
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 10px;
      padding: 8px;
      background: #fdfdfb;
      color: var(--ink);
    }

    .field select[multiple] {
      min-height: 96px;
    }

    .range-row {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 8px;
    }

    .bounds-hint {
      font-size: 0.8rem;
      color: #84887f;
    }

    .checkbox-row {
      display: flex;
      align-items: center;
      gap: 8px;
      font-size: 0.9rem;
    }

    .checkbox-row input {
      width: auto;
    }

    .content {
      display: grid;
      gap: 20px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #84887f;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.money {
      color: var(--accent);
    }

    .chart-grid {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 16px;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .chart-card.wide {
      grid-column: 1 / -1;
    }

    .chart-card h3 {
      margin: 0;
      font-size: 1.05rem;
    }

    .chart-card svg {
      width: 100%;
      height: 240px;
      display: block;
    }

    .chart-card svg text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-bar {
      fill: var(--accent);
    }

    .chart-bar.alt {
      fill: var(--accent-3);
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid-line {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a7f76;
      font-size: 11px;
    }

    .chart-value {
      fill: var(--accent-2);
      font-size: 11px;
      font-weight: 600;
    }

    details.applied {
      background: white;
      border-radius: 16px;
      padding: 14px 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      font-size: 0.92rem;
    }

    details.applied summary {
      cursor: pointer;
      font-weight: 600;
    }

    details.applied dl {
      display: grid;
      grid-template-columns: max-content 1fr;
      gap: 4px 14px;
      margin: 12px 0 0;
    }

    details.applied dt {
      color: #84887f;
    }

    details.applied dd {
      margin: 0;
    }

    .status {
      font-size: 0.95rem;
      color: #6b7168;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    footer {
      text-align: center;
      color: #8b9088;
      font-size: 0.85rem;
      border-top: 1px solid rgba(47, 72, 88, 0.1);
      padding-top: 16px;
    }

    @media (max-width: 760px) {
      .layout,
      .chart-grid {
        grid-template-columns: 1fr;
      }
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Sales Dashboard</h1>
      <p class="subtitle">Interactive supermarket sales by region, product, and date.</p>
      <p class="subtitle" id="coverage">{{COVERAGE}}</p>
    </header>

    <div class="layout">
      <aside class="sidebar">
        <h2>Filters</h2>
        <div class="field">
          <label for="regions">Region</label>
          <select id="regions" multiple></select>
        </div>
        <div class="field">
          <label for="products">Product</label>
          <select id="products" multiple></select>
        </div>
        <div class="field">
          <div class="checkbox-row">
            <input type="checkbox" id="date-toggle" />
            <label for="date-toggle">Filter by date</label>
          </div>
          <input type="date" id="date-ceiling" disabled />
        </div>
        <div class="field">
          <label>Sale value</label>
          <div class="range-row">
            <input type="number" id="min-value" step="any" placeholder="min" />
            <input type="number" id="max-value" step="any" placeholder="max" />
          </div>
          <span class="bounds-hint" id="bounds-hint"></span>
        </div>
      </aside>

      <section class="content">
        <div class="panel">
          <div class="stat">
            <span class="label">Total sales</span>
            <span class="value money" id="kpi-total">–</span>
          </div>
          <div class="stat">
            <span class="label">Average ticket</span>
            <span class="value money" id="kpi-average">–</span>
          </div>
          <div class="stat">
            <span class="label">Orders</span>
            <span class="value" id="kpi-count">–</span>
          </div>
        </div>

        <div class="chart-grid">
          <div class="chart-card">
            <h3>Sales by region</h3>
            <svg id="chart-region" viewBox="0 0 520 240" role="img" aria-label="Sales by region"></svg>
          </div>
          <div class="chart-card">
            <h3>Sales by product</h3>
            <svg id="chart-product" viewBox="0 0 520 240" role="img" aria-label="Sales by product"></svg>
          </div>
          <div class="chart-card wide">
            <h3>Sales over time</h3>
            <svg id="chart-date" viewBox="0 0 1040 240" role="img" aria-label="Sales over time"></svg>
          </div>
        </div>

        <details class="applied">
          <summary>Applied filters</summary>
          <dl>
            <dt>Regions</dt><dd id="applied-regions">All</dd>
            <dt>Products</dt><dd id="applied-products">All</dd>
            <dt>Date ceiling</dt><dd id="applied-date">–</dd>
            <dt>Value range</dt><dd id="applied-range">–</dd>
            <dt>Rows after filter</dt><dd id="applied-rows">–</dd>
          </dl>
        </details>

        <div class="status" id="status"></div>
      </section>
    </div>

    <footer>Supermarket sales analytics &middot; dataset loaded once per session</footer>
  </main>

  <script>
    const regionsEl = document.getElementById('regions');
    const productsEl = document.getElementById('products');
    const dateToggleEl = document.getElementById('date-toggle');
    const dateEl = document.getElementById('date-ceiling');
    const minValueEl = document.getElementById('min-value');
    const maxValueEl = document.getElementById('max-value');
    const boundsHintEl = document.getElementById('bounds-hint');
    const statusEl = document.getElementById('status');

    const money = new Intl.NumberFormat('pt-BR', { style: 'currency', currency: 'BRL' });
    const integer = new Intl.NumberFormat('pt-BR');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const selectedValues = (select) =>
      Array.from(select.selectedOptions).map((option) => option.value);

    const fillSelect = (select, values) => {
      select.innerHTML = '';
      values.forEach((value) => {
        const option = document.createElement('option');
        option.value = value;
        option.textContent = value;
        select.appendChild(option);
      });
    };

    const buildQuery = () => {
      const params = new URLSearchParams();
      const regions = selectedValues(regionsEl);
      const products = selectedValues(productsEl);
      if (regions.length) params.set('regions', regions.join(','));
      if (products.length) params.set('products', products.join(','));
      if (minValueEl.value !== '') params.set('min_value', minValueEl.value);
      if (maxValueEl.value !== '') params.set('max_value', maxValueEl.value);
      if (dateToggleEl.checked && dateEl.value) params.set('date_ceiling', dateEl.value);
      return params.toString();
    };

    const renderBarChart = (svg, points, barClass) => {
      if (!points.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data for these filters</text>';
        return;
      }

      const width = Number(svg.viewBox.baseVal.width);
      const height = Number(svg.viewBox.baseVal.height);
      const paddingX = 24;
      const paddingY = 34;
      const top = 26;

      const max = Math.max(...points.map((point) => point.value), 0) || 1;
      const slot = (width - paddingX * 2) / points.length;
      const barWidth = Math.min(slot * 0.6, 80);
      const scaleY = (height - top - paddingY) / max;

      let parts = '';
      points.forEach((point, index) => {
        const cx = paddingX + slot * index + slot / 2;
        const barHeight = point.value * scaleY;
        const y = height - paddingY - barHeight;
        parts += `<rect class="chart-bar ${barClass}" x="${(cx - barWidth / 2).toFixed(2)}" y="${y.toFixed(2)}" width="${barWidth.toFixed(2)}" height="${barHeight.toFixed(2)}" rx="6" />`;
        parts += `<text class="chart-value" x="${cx}" y="${(y - 6).toFixed(2)}" text-anchor="middle">${integer.format(Math.round(point.value))}</text>`;
        parts += `<text class="chart-label" x="${cx}" y="${height - paddingY + 18}" text-anchor="middle">${point.label}</text>`;
      });

      svg.innerHTML = parts;
    };

    const renderLineChart = (svg, points) => {
      if (!points.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data for these filters</text>';
        return;
      }

      const width = Number(svg.viewBox.baseVal.width);
      const height = Number(svg.viewBox.baseVal.height);
      const paddingX = 48;
      const paddingY = 34;
      const top = 24;

      const values = points.map((point) => point.value);
      let min = Math.min(...values, 0);
      let max = Math.max(...values, 0);
      if (min === max) {
        max += 1;
      }

      const range = max - min;
      const xStep = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const scaleY = (height - top - paddingY) / range;
      const x = (index) => paddingX + index * xStep;
      const y = (value) => height - paddingY - (value - min) * scaleY;

      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.value).toFixed(2)}`)
        .join(' ');

      const ticks = 4;
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + (range * i) / ticks;
        const yPos = y(value);
        grid += `<line class="chart-grid-line" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${integer.format(Math.round(value))}</text>`;
      }

      const labelEvery = Math.ceil(points.length / 10);
      const xLabels = points
        .map((point, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          return `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.label}</text>`;
        })
        .join('');

      const circles = points
        .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.value)}" r="4" />`)
        .join('');

      svg.innerHTML = `${grid}<path class="chart-line" d="${path}" />${circles}${xLabels}`;
    };

    const renderDashboard = (data) => {
      document.getElementById('kpi-total').textContent = money.format(data.metrics.total_sales);
      document.getElementById('kpi-average').textContent = money.format(data.metrics.average_ticket);
      document.getElementById('kpi-count').textContent = integer.format(data.metrics.order_count);

      boundsHintEl.textContent = `Bounds for selected regions: ${money.format(data.value_bounds.min)} – ${money.format(data.value_bounds.max)}`;
      minValueEl.min = data.value_bounds.min;
      minValueEl.max = data.value_bounds.max;
      maxValueEl.min = data.value_bounds.min;
      maxValueEl.max = data.value_bounds.max;
      minValueEl.placeholder = data.value_bounds.min;
      maxValueEl.placeholder = data.value_bounds.max;

      renderBarChart(
        document.getElementById('chart-region'),
        data.by_region.map((point) => ({ label: point.key, value: point.total })),
        ''
      );
      renderBarChart(
        document.getElementById('chart-product'),
        data.by_product.map((point) => ({ label: point.key, value: point.total })),
        'alt'
      );
      renderLineChart(
        document.getElementById('chart-date'),
        data.by_date.map((point) => ({ label: point.date.slice(5), value: point.total }))
      );

      document.getElementById('applied-regions').textContent =
        data.applied.regions.length ? data.applied.regions.join(', ') : 'All';
      document.getElementById('applied-products').textContent =
        data.applied.products.length ? data.applied.products.join(', ') : 'All';
      document.getElementById('applied-date').textContent = data.applied.date_ceiling;
      document.getElementById('applied-range').textContent =
        `${money.format(data.applied.min_value)} – ${money.format(data.applied.max_value)}`;
      document.getElementById('applied-rows').textContent = integer.format(data.applied.row_count);
    };

    const refresh = async () => {
      const query = buildQuery();
      const res = await fetch(`/api/dashboard${query ? `?${query}` : ''}`);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Unable to load dashboard');
      }
      renderDashboard(await res.json());
      setStatus('', '');
    };

    const loadMeta = async () => {
      const res = await fetch('/api/meta');
      if (!res.ok) {
        throw new Error('Unable to load filter options');
      }
      const meta = await res.json();
      fillSelect(regionsEl, meta.regions);
      fillSelect(productsEl, meta.products);
      if (meta.max_date) {
        dateEl.value = meta.max_date;
        dateEl.max = meta.max_date;
      }
    };

    dateToggleEl.addEventListener('change', () => {
      dateEl.disabled = !dateToggleEl.checked;
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    // Region changes move the slider bounds, so stale manual bounds are
    // cleared before the refresh listener below builds the query.
    regionsEl.addEventListener('change', () => {
      minValueEl.value = '';
      maxValueEl.value = '';
    });

    [regionsEl, productsEl, dateEl, minValueEl, maxValueEl].forEach((control) => {
      control.addEventListener('change', () => {
        refresh().catch((err) => setStatus(err.message, 'error'));
      });
    });

    loadMeta()
      .then(refresh)
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_injects_the_coverage_line() {
        let page = render_index(42, Some("2024-06-30".parse().unwrap()));
        assert!(page.contains("42 transactions through 2024-06-30"));
        assert!(!page.contains("{{COVERAGE}}"));
    }

    #[test]
    fn empty_dataset_renders_a_placeholder_line() {
        let page = render_index(0, None);
        assert!(page.contains("no transactions loaded"));
    }
}
