use crate::stats::GOAL_SCORE;

/// Renders the single page. Everything on it is drawn client-side from the
/// JSON API; the server only injects the starting window size.
pub fn render_index(default_days: usize) -> String {
    INDEX_HTML
        .replace("{{DAYS}}", &default_days.to_string())
        .replace("{{GOAL}}", &GOAL_SCORE.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    body { margin: 0; background: #f8fafc; color: #1e293b; font-family: system-ui, sans-serif; }
    .app { max-width: 28rem; margin: 0 auto; min-height: 100vh; display: flex; flex-direction: column; }
    header { background: #fff; padding: 1.5rem 1.25rem; border-bottom: 1px solid #f1f5f9; }
    .bar { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1rem; }
    h1 { font-size: 1.25rem; font-weight: 900; margin: 0; }
    .tabs { display: flex; background: #f1f5f9; padding: 4px; border-radius: 12px; }
    .tabs button { border: 0; background: none; padding: 6px 16px; border-radius: 8px; font-weight: 700; font-size: 12px; color: #94a3b8; cursor: pointer; }
    .tabs button.active { background: #fff; color: #2563eb; }
    input { font: inherit; }
    .days { width: 100%; border: 1px solid #e2e8f0; background: #f8fafc; border-radius: 12px; padding: 8px 14px; font-weight: 700; box-sizing: border-box; }
    main { flex: 1; padding: 1.25rem; }
    .card { background: #fff; border-radius: 16px; border: 1px solid #f1f5f9; margin-bottom: 1.5rem; padding: 1rem; }
    .card h2 { font-size: 1.1rem; margin: 0; cursor: pointer; }
    .head { display: flex; justify-content: space-between; align-items: center; }
    .pill { font-size: 12px; font-weight: 700; padding: 4px 12px; border-radius: 999px; background: #eff6ff; color: #3b82f6; }
    .pill.hit { background: #d1fae5; color: #059669; }
    svg { width: 100%; height: 8rem; margin-top: .5rem; }
    table { width: 100%; font-size: 14px; margin-top: 1rem; border-collapse: collapse; }
    th { font-size: 10px; color: #cbd5e1; font-weight: 600; }
    td { padding: 6px 0; text-align: center; }
    td.name { text-align: left; font-weight: 600; }
    .cell { width: 28px; height: 28px; border: 0; border-radius: 8px; background: #f1f5f9; cursor: pointer; }
    .cell.on { background: #3b82f6; }
    .theme .cell.on { background: #8b5cf6; }
    .trash { border: 0; background: none; color: #cbd5e1; cursor: pointer; }
    .add { width: 100%; border: 0; outline: none; font-size: 12px; margin-top: .75rem; background: transparent; }
    .add.big { background: #fff; border: 1px solid #f1f5f9; border-radius: 16px; padding: 1rem; font-size: 14px; margin-bottom: 1.5rem; box-sizing: border-box; }
    .new-theme { width: 100%; padding: 1rem; border-radius: 16px; border: 2px dashed #e2e8f0; background: none; color: #94a3b8; font-weight: 700; cursor: pointer; }
    .total { display: flex; justify-content: space-between; align-items: center; }
    .total .count { font-size: 1.5rem; font-weight: 900; color: #3b82f6; }
    .since { font-size: 10px; color: #94a3b8; text-transform: uppercase; letter-spacing: .1em; }
  </style>
</head>
<body>
  <div class="app">
    <header>
      <div class="bar">
        <h1>Habit Tracker</h1>
        <div class="tabs">
          <button class="active" data-tab="tracker">Track</button>
          <button data-tab="stats">Stats</button>
        </div>
      </div>
      <input id="days" class="days" value="{{DAYS}}" />
    </header>
    <main id="main"></main>
  </div>

  <script>
    const GOAL = {{GOAL}};
    const main = document.getElementById('main');
    const daysInput = document.getElementById('days');
    const collapsed = {};
    let tab = 'tracker';

    const api = async (path, body) => {
      const init = body === undefined ? {} : {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      };
      const res = await fetch(path, init);
      if (!res.ok) {
        const err = await res.json().catch(() => ({}));
        throw new Error(err.error || 'Request failed');
      }
      return res.json();
    };

    const el = (tag, attrs = {}, ...children) => {
      const node = document.createElement(tag);
      Object.entries(attrs).forEach(([key, value]) => {
        if (key.startsWith('on')) node.addEventListener(key.slice(2), value);
        else node.setAttribute(key, value);
      });
      children.flat().forEach((child) => node.append(child));
      return node;
    };

    const chart = (series, theme) => {
      const ns = 'http://www.w3.org/2000/svg';
      const svg = document.createElementNS(ns, 'svg');
      svg.setAttribute('viewBox', '0 0 100 40');
      svg.setAttribute('preserveAspectRatio', 'none');
      const step = series.length > 1 ? 100 / (series.length - 1) : 0;
      const y = (score) => 36 - score * 0.32;
      const goal = document.createElementNS(ns, 'line');
      Object.entries({ x1: 0, x2: 100, y1: y(GOAL), y2: y(GOAL), stroke: '#10b981', 'stroke-dasharray': '2 2', 'stroke-width': 0.4 })
        .forEach(([k, v]) => goal.setAttribute(k, v));
      svg.append(goal);
      const line = document.createElementNS(ns, 'polyline');
      line.setAttribute('points', series.map((p, i) => `${i * step},${y(p.score)}`).join(' '));
      line.setAttribute('fill', 'none');
      line.setAttribute('stroke', theme ? '#8b5cf6' : '#2563eb');
      line.setAttribute('stroke-width', 1.2);
      svg.append(line);
      return svg;
    };

    const addInput = (placeholder, cls, onSubmit) => el('input', {
      class: cls,
      placeholder,
      onkeydown: (event) => {
        if (event.key !== 'Enter') return;
        onSubmit(event.target.value);
        event.target.value = '';
      }
    });

    const section = (view) => {
      const theme = view.theme_id !== null;
      const isCollapsed = theme && collapsed[view.theme_id];
      const card = el('div', { class: theme ? 'card theme' : 'card' },
        el('div', { class: 'head' },
          el('h2', { onclick: () => { if (theme) { collapsed[view.theme_id] = !collapsed[view.theme_id]; refresh(); } } },
            (theme ? (isCollapsed ? '▸ ' : '▾ ') : '') + view.title),
          el('span', { class: view.on_target ? 'pill hit' : 'pill' }, `${view.average}%`)));
      if (isCollapsed) return card;

      card.append(chart(view.series, theme));
      const rows = view.items.map((item) => el('tr', {},
        el('td', {}, el('button', { class: 'trash', onclick: () => remove(item) }, '✕')),
        el('td', { class: 'name' }, item.name),
        view.recent_dates.map((date, i) => el('td', {},
          el('button', { class: item.recent[i] ? 'cell on' : 'cell', onclick: () => toggle(date, item.id) })))));
      card.append(el('table', {},
        el('thead', {}, el('tr', {}, el('th'), el('th', {}, 'HABIT'), view.recent_dates.map((d) => el('th', {}, d.slice(8))))),
        el('tbody', {}, rows)));
      if (theme) {
        card.append(addInput('+ 새 습관 추가 (엔터)', 'add', (name) => addItem(name, view.theme_id)));
      }
      return card;
    };

    const renderTracker = async () => {
      const days = encodeURIComponent(daysInput.value);
      const { sections } = await api(`/api/sections?days=${days}`);
      const [overall, ...themes] = sections;
      main.replaceChildren(
        section(overall),
        addInput('+ 새로운 전체 습관 추가...', 'add big', (name) => addItem(name, null)),
        ...themes.map(section),
        el('button', { class: 'new-theme', onclick: addTheme }, '+ Create Theme'));
    };

    const renderStats = async () => {
      const { totals } = await api('/api/totals');
      main.replaceChildren(...totals.map((item) => el('div', { class: 'card total' },
        el('div', {}, el('div', {}, el('b', {}, item.name)), el('div', { class: 'since' }, `Since ${item.created_at}`)),
        el('div', {}, el('div', { class: 'count' }, String(item.total)), el('div', { class: 'since' }, 'Days')))));
    };

    const refresh = () => (tab === 'tracker' ? renderTracker() : renderStats()).catch((err) => alert(err.message));

    const addItem = (name, themeId) =>
      api('/api/items', { name, theme_id: themeId }).then(refresh).catch((err) => alert(err.message));

    const toggle = (date, itemId) =>
      api('/api/checks', { date, item_id: itemId }).then(refresh).catch((err) => alert(err.message));

    const remove = (item) => {
      if (!confirm('삭제하시겠습니까?')) return;
      api(`/api/items/${item.id}/deactivate`, { confirmed: true }).then(refresh).catch((err) => alert(err.message));
    };

    const addTheme = () => {
      const name = prompt('새 테마 이름:');
      if (!name) return;
      api('/api/themes', { name }).then(refresh).catch((err) => alert(err.message));
    };

    document.querySelectorAll('.tabs button').forEach((button) => {
      button.addEventListener('click', () => {
        tab = button.dataset.tab;
        document.querySelectorAll('.tabs button').forEach((b) => b.classList.toggle('active', b === button));
        refresh();
      });
    });
    daysInput.addEventListener('input', refresh);

    refresh();
  </script>
</body>
</html>
"#;
