//! The skeletal snapshot: equivalence classes of vertices, edges and
//! triangles induced by the face gluings, together with connected
//! components and boundary components.
//!
//! A snapshot is built in one pass over the gluings and cached by the
//! owning [`Triangulation`](crate::Triangulation); every mutation discards
//! it.  All cross-references are indices into the snapshot's own arenas, so
//! a stale index can never dangle — it is simply an index into the wrong
//! snapshot, and callers are expected to re-query after mutating.
//!
//! Edge classes carry their embeddings in ring order around the edge.  The
//! ordering contract: walking forward from one embedding crosses the face
//! numbered by the image of 3 under its vertex mapping, and arrives at the
//! next embedding whose mapping sends 2 to the crossed face — i.e.
//! consecutive mappings differ by the gluing composed with the (2 3) swap.
//! Composing the gluings all the way around the ring acts trivially on the
//! edge ends exactly when the edge is valid.

use crate::perm::{edge_number, edge_ordering, face_ordering, Perm4};
use crate::tetrahedron::{FaceGluing, Tetrahedron};

const SWAP23: Perm4 = crate::perm::perm(0, 1, 3, 2);
const NONE: usize = usize::MAX;

/// One appearance of a vertex class inside a tetrahedron.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexEmbedding {
    /// The containing tetrahedron
    pub tet: usize,
    /// The vertex label (0..4) within it
    pub vertex: usize,
}

/// One appearance of an edge class inside a tetrahedron.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EdgeEmbedding {
    /// The containing tetrahedron
    pub tet: usize,
    /// The edge label (0..6) within it
    pub edge: usize,
}

/// One appearance of a triangle class inside a tetrahedron.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TriangleEmbedding {
    /// The containing tetrahedron
    pub tet: usize,
    /// The face label (0..4) within it
    pub face: usize,
}

/// Classification of a vertex by the surface formed by its link.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexLink {
    /// A 2-sphere: an ordinary interior vertex
    Sphere,
    /// A disc: an ordinary vertex on a real boundary component
    Disc,
    /// A torus: an ideal vertex with a torus cusp
    Torus,
    /// A Klein bottle: an ideal vertex with a Klein bottle cusp
    KleinBottle,
    /// Some other closed surface: an ideal vertex
    ClosedOther,
    /// Bounded but not a disc, or pinched by an invalid edge: the vertex
    /// is invalid
    Invalid,
}

/// A vertex of the skeleton.
#[derive(Debug, Clone)]
pub struct Vertex {
    embeddings: Vec<VertexEmbedding>,
    component: usize,
    boundary_component: Option<usize>,
    link_closed: bool,
    link_euler: i64,
    link_orientable: bool,
    touches_invalid_edge: bool,
}

impl Vertex {
    /// The (tetrahedron, vertex) pairs forming this class, in discovery
    /// order.
    pub fn embeddings(&self) -> &[VertexEmbedding] {
        &self.embeddings
    }

    /// Number of embeddings.
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    /// Index of the component containing this vertex.
    pub fn component(&self) -> usize {
        self.component
    }

    /// The boundary component this vertex lies in, if any.
    pub fn boundary_component(&self) -> Option<usize> {
        self.boundary_component
    }

    /// Euler characteristic of the vertex link.
    pub fn link_euler_characteristic(&self) -> i64 {
        self.link_euler
    }

    /// Classifies the link surface.
    pub fn link(&self) -> VertexLink {
        if self.touches_invalid_edge {
            return VertexLink::Invalid;
        }
        if self.link_closed {
            match (self.link_euler, self.link_orientable) {
                (2, _) => VertexLink::Sphere,
                (0, true) => VertexLink::Torus,
                (0, false) => VertexLink::KleinBottle,
                _ => VertexLink::ClosedOther,
            }
        } else if self.link_euler == 1 {
            VertexLink::Disc
        } else {
            VertexLink::Invalid
        }
    }

    /// Whether the link is a sphere or a disc.
    pub fn is_standard(&self) -> bool {
        matches!(self.link(), VertexLink::Sphere | VertexLink::Disc)
    }

    /// Whether this vertex is ideal: the link is a closed surface other
    /// than a sphere.
    pub fn is_ideal(&self) -> bool {
        matches!(
            self.link(),
            VertexLink::Torus | VertexLink::KleinBottle | VertexLink::ClosedOther
        )
    }

    /// Whether this vertex is valid (standard or ideal).
    pub fn is_valid(&self) -> bool {
        self.link() != VertexLink::Invalid
    }

    /// Whether this vertex lies on the boundary (real, ideal or invalid).
    pub fn is_boundary(&self) -> bool {
        self.boundary_component.is_some()
    }
}

/// An edge of the skeleton.
#[derive(Debug, Clone)]
pub struct Edge {
    embeddings: Vec<EdgeEmbedding>,
    component: usize,
    boundary_component: Option<usize>,
    valid: bool,
    boundary: bool,
}

impl Edge {
    /// The (tetrahedron, edge) pairs forming this class, in ring order
    /// around the edge.  A class may contain several edges of one
    /// tetrahedron.
    pub fn embeddings(&self) -> &[EdgeEmbedding] {
        &self.embeddings
    }

    /// Number of embeddings.
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    /// Index of the component containing this edge.
    pub fn component(&self) -> usize {
        self.component
    }

    /// The boundary component this edge lies in, if any.
    pub fn boundary_component(&self) -> Option<usize> {
        self.boundary_component
    }

    /// Whether this edge is valid, i.e. never identified with itself with
    /// its ends reversed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether this edge lies on the boundary.
    pub fn is_boundary(&self) -> bool {
        self.boundary
    }
}

/// Classification of a triangle by the identifications among its own
/// vertices and edges.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TriangleType {
    /// No identified vertices or edges
    Plain,
    /// Two vertices identified
    Scarf,
    /// All three vertices identified, edges distinct
    Parachute,
    /// Two edges identified, forming a cone
    Cone,
    /// Two edges identified, forming a Mobius band
    Mobius,
    /// A cone with all three vertices identified
    Horn,
    /// All three edges identified, mixed orientations: a dunce hat
    DunceHat,
    /// All three edges identified coherently: a spine for L(3,1)
    L31,
}

/// A triangle of the skeleton.
#[derive(Debug, Clone)]
pub struct Triangle {
    embeddings: Vec<TriangleEmbedding>,
    component: usize,
    boundary_component: Option<usize>,
    triangle_type: TriangleType,
    subtype: Option<usize>,
}

impl Triangle {
    /// The one or two (tetrahedron, face) pairs forming this class.
    pub fn embeddings(&self) -> &[TriangleEmbedding] {
        &self.embeddings
    }

    /// Number of embeddings (1 for boundary, 2 for internal).
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    /// Index of the component containing this triangle.
    pub fn component(&self) -> usize {
        self.component
    }

    /// The boundary component this triangle lies in, if any.
    pub fn boundary_component(&self) -> Option<usize> {
        self.boundary_component
    }

    /// Whether this triangle lies on the boundary.
    pub fn is_boundary(&self) -> bool {
        self.embeddings.len() == 1
    }

    /// The identification type of this triangle.
    pub fn triangle_type(&self) -> TriangleType {
        self.triangle_type
    }

    /// The vertex or edge of the triangle playing the distinguished role
    /// for [`Scarf`](TriangleType::Scarf), [`Cone`](TriangleType::Cone),
    /// [`Mobius`](TriangleType::Mobius) and [`Horn`](TriangleType::Horn).
    pub fn subtype(&self) -> Option<usize> {
        self.subtype
    }

    /// Whether the triangle forms a Mobius band (possibly with extra
    /// identifications).
    pub fn is_mobius_band(&self) -> bool {
        matches!(
            self.triangle_type,
            TriangleType::Mobius | TriangleType::DunceHat | TriangleType::L31
        )
    }

    /// Whether the triangle forms a cone (possibly with extra
    /// identifications).
    pub fn is_cone(&self) -> bool {
        matches!(
            self.triangle_type,
            TriangleType::Cone | TriangleType::Horn | TriangleType::DunceHat
        )
    }
}

/// A connected component of the triangulation.
#[derive(Debug, Clone)]
pub struct Component {
    tets: Vec<usize>,
    orientable: bool,
    ideal: bool,
    closed: bool,
    valid: bool,
}

impl Component {
    /// The tetrahedra of this component, in index order.
    pub fn tetrahedra(&self) -> &[usize] {
        &self.tets
    }

    /// Number of tetrahedra in this component.
    pub fn num_tetrahedra(&self) -> usize {
        self.tets.len()
    }

    /// Whether the component admits a consistent orientation.
    pub fn is_orientable(&self) -> bool {
        self.orientable
    }

    /// Whether the component contains an ideal vertex.
    pub fn is_ideal(&self) -> bool {
        self.ideal
    }

    /// Whether the component has no boundary components of any kind.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether every edge and vertex of the component is valid.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// The nature of a boundary component.
#[derive(Debug, Clone)]
pub enum BoundaryKind {
    /// Built from real boundary triangles
    Real {
        /// Triangle classes of the component
        triangles: Vec<usize>,
        /// Boundary edge classes of the component
        edges: Vec<usize>,
        /// Vertex classes touching the component
        vertices: Vec<usize>,
    },
    /// A single ideal vertex
    Ideal {
        /// The ideal vertex class
        vertex: usize,
    },
    /// A single invalid vertex that is not on any real boundary
    InvalidVertex {
        /// The invalid vertex class
        vertex: usize,
    },
}

/// A connected piece of the boundary: either a 2-complex of real boundary
/// triangles, or a single ideal or invalid vertex.
#[derive(Debug, Clone)]
pub struct BoundaryComponent {
    kind: BoundaryKind,
    component: usize,
    euler: i64,
    orientable: bool,
}

impl BoundaryComponent {
    /// What this boundary component is made of.
    pub fn kind(&self) -> &BoundaryKind {
        &self.kind
    }

    /// Index of the component carrying this boundary.
    pub fn component(&self) -> usize {
        self.component
    }

    /// Euler characteristic of the boundary surface (for an ideal or
    /// invalid vertex, of its link).
    pub fn euler_characteristic(&self) -> i64 {
        self.euler
    }

    /// Whether the boundary surface is orientable.
    pub fn is_orientable(&self) -> bool {
        self.orientable
    }

    /// Whether this component consists of real boundary triangles.
    pub fn is_real(&self) -> bool {
        matches!(self.kind, BoundaryKind::Real { .. })
    }

    /// Whether this component is a single ideal vertex.
    pub fn is_ideal(&self) -> bool {
        matches!(self.kind, BoundaryKind::Ideal { .. })
    }

    /// Number of real boundary triangles (0 for ideal / invalid-vertex
    /// components).
    pub fn num_triangles(&self) -> usize {
        match &self.kind {
            BoundaryKind::Real { triangles, .. } => triangles.len(),
            _ => 0,
        }
    }
}

/// The complete skeletal snapshot of a triangulation.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    components: Vec<Component>,
    boundary_components: Vec<BoundaryComponent>,

    tet_vertex: Vec<[usize; 4]>,
    tet_edge: Vec<[usize; 6]>,
    tet_edge_mapping: Vec<[Perm4; 6]>,
    tet_triangle: Vec<[usize; 4]>,
    tet_triangle_mapping: Vec<[Perm4; 4]>,
    tet_component: Vec<usize>,
    tet_orientation: Vec<i8>,
}

impl Skeleton {
    /// All vertex classes, in discovery order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edge classes, in discovery order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All triangle classes, in discovery order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// All connected components, in discovery order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// All boundary components: real ones first, then one per ideal or
    /// invalid vertex.
    pub fn boundary_components(&self) -> &[BoundaryComponent] {
        &self.boundary_components
    }

    /// The vertex class of vertex `v` of tetrahedron `t`.
    pub fn tet_vertex(&self, t: usize, v: usize) -> usize {
        self.tet_vertex[t][v]
    }

    /// The edge class of edge `e` of tetrahedron `t`.
    pub fn tet_edge(&self, t: usize, e: usize) -> usize {
        self.tet_edge[t][e]
    }

    /// The vertex mapping of edge `e` of tetrahedron `t`: images of 0 and 1
    /// are the ends of the edge, and walking forward in the embedding ring
    /// exits through the face numbered by the image of 3.
    pub fn tet_edge_mapping(&self, t: usize, e: usize) -> Perm4 {
        self.tet_edge_mapping[t][e]
    }

    /// The triangle class of face `f` of tetrahedron `t`.
    pub fn tet_triangle(&self, t: usize, f: usize) -> usize {
        self.tet_triangle[t][f]
    }

    /// The vertex mapping of face `f` of tetrahedron `t`: images of 0,1,2
    /// are the face's vertices, consistently across the two embeddings of
    /// an internal triangle, and the image of 3 is `f`.
    pub fn tet_triangle_mapping(&self, t: usize, f: usize) -> Perm4 {
        self.tet_triangle_mapping[t][f]
    }

    /// The component containing tetrahedron `t`.
    pub fn tet_component(&self, t: usize) -> usize {
        self.tet_component[t]
    }

    /// The orientation (+1 or -1) assigned to tetrahedron `t`; the
    /// lowest-indexed tetrahedron of each component carries +1, and on an
    /// orientable component neighbours satisfy
    /// `orientation(u) == -sign(gluing) * orientation(t)`.
    pub fn tet_orientation(&self, t: usize) -> i8 {
        self.tet_orientation[t]
    }

    /// The vertex class at the given end (0 or 1) of an edge class.
    pub fn edge_vertex(&self, edge: usize, end: usize) -> usize {
        let emb = self.edges[edge].embeddings[0];
        let map = self.tet_edge_mapping[emb.tet][emb.edge];
        self.tet_vertex[emb.tet][map.apply(end)]
    }

    /// The edge class along side `i` of a triangle class (the side
    /// opposite the triangle's vertex `i`).
    pub fn triangle_edge(&self, triangle: usize, i: usize) -> usize {
        let emb = self.triangles[triangle].embeddings[0];
        let m = self.tet_triangle_mapping[emb.tet][emb.face];
        let a = m.apply((i + 1) % 3);
        let b = m.apply((i + 2) % 3);
        self.tet_edge[emb.tet][edge_number(a, b)]
    }

    /// A mapping carrying 0,1 to the positions (0..3) within the triangle
    /// of the ends of side `i`, matching the ambient edge's own end order,
    /// and carrying 2 to `i`.
    pub fn triangle_edge_mapping(&self, triangle: usize, i: usize) -> Perm4 {
        let emb = self.triangles[triangle].embeddings[0];
        let m = self.tet_triangle_mapping[emb.tet][emb.face];
        let a = m.apply((i + 1) % 3);
        let b = m.apply((i + 2) % 3);
        let em = self.tet_edge_mapping[emb.tet][edge_number(a, b)];
        let j0 = m.preimage(em.apply(0));
        let j1 = m.preimage(em.apply(1));
        Perm4::from_images(j0 as u8, j1 as u8, i as u8, 3)
            .expect("triangle side positions are distinct")
    }

    /// The vertex class at corner `i` of a triangle class.
    pub fn triangle_vertex(&self, triangle: usize, i: usize) -> usize {
        let emb = self.triangles[triangle].embeddings[0];
        let m = self.tet_triangle_mapping[emb.tet][emb.face];
        self.tet_vertex[emb.tet][m.apply(i)]
    }

    /// Whether every edge and every vertex is valid.
    pub fn is_valid(&self) -> bool {
        self.edges.iter().all(|e| e.valid) && self.vertices.iter().all(|v| v.is_valid())
    }

    /// Builds the snapshot for the given gluings.
    pub(crate) fn build(tets: &[Tetrahedron]) -> Skeleton {
        let n = tets.len();
        let mut skel = Skeleton {
            tet_vertex: vec![[NONE; 4]; n],
            tet_edge: vec![[NONE; 6]; n],
            tet_edge_mapping: vec![[Perm4::IDENTITY; 6]; n],
            tet_triangle: vec![[NONE; 4]; n],
            tet_triangle_mapping: vec![[Perm4::IDENTITY; 4]; n],
            tet_component: vec![NONE; n],
            tet_orientation: vec![0; n],
            ..Skeleton::default()
        };
        skel.build_components(tets);
        skel.build_vertices(tets);
        skel.build_edges(tets);
        skel.build_vertex_links(tets);
        skel.build_triangles(tets);
        skel.build_boundary_components(tets);
        skel.finish_components();
        skel
    }

    fn build_components(&mut self, tets: &[Tetrahedron]) {
        let n = tets.len();
        for start in 0..n {
            if self.tet_component[start] != NONE {
                continue;
            }
            let index = self.components.len();
            let mut orientable = true;
            let mut members = vec![start];
            self.tet_component[start] = index;
            self.tet_orientation[start] = 1;
            let mut head = 0;
            while head < members.len() {
                let t = members[head];
                head += 1;
                for face in 0..4 {
                    let Some(FaceGluing { tet: u, gluing }) = tets[t].adj[face] else {
                        continue;
                    };
                    // An odd gluing joins consistently oriented cells.
                    let expected = -gluing.sign() * self.tet_orientation[t];
                    if self.tet_component[u] == NONE {
                        self.tet_component[u] = index;
                        self.tet_orientation[u] = expected;
                        members.push(u);
                    } else if self.tet_orientation[u] != expected {
                        orientable = false;
                    }
                }
            }
            members.sort_unstable();
            self.components.push(Component {
                tets: members,
                orientable,
                ideal: false,
                closed: true,
                valid: true,
            });
        }
    }

    fn build_vertices(&mut self, tets: &[Tetrahedron]) {
        let n = tets.len();
        let mut uf = UnionFind::new(4 * n);
        for (t, tet) in tets.iter().enumerate() {
            for face in 0..4 {
                let Some(FaceGluing { tet: u, gluing }) = tet.adj[face] else {
                    continue;
                };
                for v in 0..4 {
                    if v != face {
                        uf.union(4 * t + v, 4 * u + gluing.apply(v));
                    }
                }
            }
        }
        let mut class_of_root = vec![NONE; 4 * n];
        for t in 0..n {
            for v in 0..4 {
                let root = uf.find(4 * t + v);
                let class = if class_of_root[root] == NONE {
                    class_of_root[root] = self.vertices.len();
                    self.vertices.push(Vertex {
                        embeddings: Vec::new(),
                        component: self.tet_component[t],
                        boundary_component: None,
                        link_closed: true,
                        link_euler: 0,
                        link_orientable: true,
                        touches_invalid_edge: false,
                    });
                    self.vertices.len() - 1
                } else {
                    class_of_root[root]
                };
                self.tet_vertex[t][v] = class;
                self.vertices[class]
                    .embeddings
                    .push(VertexEmbedding { tet: t, vertex: v });
            }
        }
    }

    fn build_edges(&mut self, tets: &[Tetrahedron]) {
        let n = tets.len();
        for t0 in 0..n {
            for e0 in 0..6 {
                if self.tet_edge[t0][e0] != NONE {
                    continue;
                }
                let index = self.edges.len();

                // Walk backwards (exiting through the image of 2) until we
                // either fall off the boundary or loop back to the start.
                let mut start = (t0, e0, edge_ordering(e0));
                {
                    let (mut t, mut e, mut map) = start;
                    loop {
                        let exit = map.apply(2);
                        let Some(FaceGluing { tet: u, gluing }) = tets[t].adj[exit] else {
                            start = (t, e, map);
                            break;
                        };
                        let next = gluing.compose(map).compose(SWAP23);
                        let ue = edge_number(next.apply(0), next.apply(1));
                        if (u, ue) == (t0, e0) {
                            break; // the ring is a cycle; start anywhere
                        }
                        (t, e, map) = (u, ue, next);
                    }
                }

                // Walk forwards from the start, labelling as we go.
                let mut embeddings = Vec::new();
                let mut valid = true;
                let mut boundary = false;
                let (mut t, mut e, mut map) = start;
                loop {
                    self.tet_edge[t][e] = index;
                    self.tet_edge_mapping[t][e] = map;
                    embeddings.push(EdgeEmbedding { tet: t, edge: e });
                    let exit = map.apply(3);
                    let Some(FaceGluing { tet: u, gluing }) = tets[t].adj[exit] else {
                        boundary = true;
                        break;
                    };
                    let next = gluing.compose(map).compose(SWAP23);
                    let ue = edge_number(next.apply(0), next.apply(1));
                    if self.tet_edge[u][ue] == index {
                        // Ring closed.  A closure that swaps the ends means
                        // the edge is glued to itself in reverse.
                        if self.tet_edge_mapping[u][ue].apply(0) != next.apply(0) {
                            valid = false;
                        }
                        break;
                    }
                    debug_assert_eq!(self.tet_edge[u][ue], NONE);
                    (t, e, map) = (u, ue, next);
                }

                self.edges.push(Edge {
                    embeddings,
                    component: self.tet_component[t0],
                    boundary_component: None,
                    valid,
                    boundary,
                });
            }
        }

        // Invalid edges pinch the links of their end vertices.
        for edge in 0..self.edges.len() {
            if !self.edges[edge].valid {
                for end in 0..2 {
                    let v = self.edge_vertex(edge, end);
                    self.vertices[v].touches_invalid_edge = true;
                }
            }
        }
    }

    /// Computes, for every vertex, the Euler characteristic, closedness and
    /// orientability of the link surface built from corner triangles.
    fn build_vertex_links(&mut self, tets: &[Tetrahedron]) {
        let n = tets.len();
        // Link vertices are corner points on edges: (t, v, w) with w != v.
        // Link sides are corner arcs in faces: (t, v, f) with f != v.  Both
        // fit in 16n slots.
        let mut point_uf = UnionFind::new(16 * n);
        let mut side_uf = UnionFind::new(16 * n);
        let mut corner_uf = ParityUnionFind::new(4 * n);
        let mut link_nonorientable = vec![false; self.vertices.len()];

        for (t, tet) in tets.iter().enumerate() {
            for face in 0..4 {
                let Some(FaceGluing { tet: u, gluing }) = tet.adj[face] else {
                    for v in 0..4 {
                        if v != face {
                            self.vertices[self.tet_vertex[t][v]].link_closed = false;
                        }
                    }
                    continue;
                };
                for v in 0..4 {
                    if v == face {
                        continue;
                    }
                    let gv = gluing.apply(v);
                    side_uf.union(16 * t + 4 * v + face, 16 * u + 4 * gv + gluing.apply(face));
                    for w in 0..4 {
                        if w != v && w != face {
                            point_uf
                                .union(16 * t + 4 * v + w, 16 * u + 4 * gv + gluing.apply(w));
                        }
                    }
                    // Orientation propagation across the glued side.
                    let side: Vec<usize> =
                        (0..4).filter(|&w| w != v && w != face).collect();
                    let (x, y) = (side[0], side[1]);
                    let d1 = cyclic_forward(v, x, y);
                    let d2 = cyclic_forward(gv, gluing.apply(x), gluing.apply(y));
                    // Opposite traversal directions keep orientations equal.
                    let flip = d1 == d2;
                    if corner_uf.union(4 * t + v, 4 * u + gv, flip) {
                        link_nonorientable[self.tet_vertex[t][v]] = true;
                    }
                }
            }
        }

        // Tally the link cell counts per vertex class.
        let mut points_seen = vec![false; 16 * n];
        let mut sides_seen = vec![false; 16 * n];
        let mut euler = vec![0i64; self.vertices.len()];
        for t in 0..n {
            for v in 0..4 {
                let class = self.tet_vertex[t][v];
                euler[class] += 1; // the corner triangle itself
                for w in 0..4 {
                    if w == v {
                        continue;
                    }
                    let p = point_uf.find(16 * t + 4 * v + w);
                    if !points_seen[p] {
                        points_seen[p] = true;
                        euler[class] += 1;
                    }
                    let s = side_uf.find(16 * t + 4 * v + w);
                    if !sides_seen[s] {
                        sides_seen[s] = true;
                        euler[class] -= 1;
                    }
                }
            }
        }
        for (class, vertex) in self.vertices.iter_mut().enumerate() {
            vertex.link_euler = euler[class];
            vertex.link_orientable = !link_nonorientable[class];
        }
    }

    fn build_triangles(&mut self, tets: &[Tetrahedron]) {
        let n = tets.len();
        for t in 0..n {
            for f in 0..4 {
                if self.tet_triangle[t][f] != NONE {
                    continue;
                }
                let index = self.triangles.len();
                let mapping = face_ordering(f);
                self.tet_triangle[t][f] = index;
                self.tet_triangle_mapping[t][f] = mapping;
                let mut embeddings = vec![TriangleEmbedding { tet: t, face: f }];
                if let Some(FaceGluing { tet: u, gluing }) = tets[t].adj[f] {
                    let uf = gluing.apply(f);
                    debug_assert_eq!(self.tet_triangle[u][uf], NONE);
                    self.tet_triangle[u][uf] = index;
                    // Both mappings agree on 0,1,2 modulo the gluing.
                    self.tet_triangle_mapping[u][uf] = gluing.compose(mapping);
                    embeddings.push(TriangleEmbedding { tet: u, face: uf });
                }
                self.triangles.push(Triangle {
                    embeddings,
                    component: self.tet_component[t],
                    boundary_component: None,
                    triangle_type: TriangleType::Plain,
                    subtype: None,
                });
            }
        }

        for index in 0..self.triangles.len() {
            let (triangle_type, subtype) = self.classify_triangle(index);
            self.triangles[index].triangle_type = triangle_type;
            self.triangles[index].subtype = subtype;
        }
    }

    /// Determines the identification type of a triangle from its edge and
    /// vertex classes and the directions its sides induce on the ambient
    /// edges.
    fn classify_triangle(&self, index: usize) -> (TriangleType, Option<usize>) {
        let e: Vec<usize> = (0..3).map(|i| self.triangle_edge(index, i)).collect();
        let v: Vec<usize> = (0..3).map(|i| self.triangle_vertex(index, i)).collect();
        // d[i]: whether side i runs along its ambient edge class forwards.
        let emb = self.triangles[index].embeddings[0];
        let m = self.tet_triangle_mapping[emb.tet][emb.face];
        let d: Vec<bool> = (0..3)
            .map(|i| {
                let a = m.apply((i + 1) % 3);
                let b = m.apply((i + 2) % 3);
                let em = self.tet_edge_mapping[emb.tet][edge_number(a, b)];
                em.apply(0) == a
            })
            .collect();

        if e[0] != e[1] && e[1] != e[2] && e[0] != e[2] {
            if v[0] == v[1] && v[1] == v[2] {
                (TriangleType::Parachute, None)
            } else if let Some(i) = (0..3).find(|&i| v[(i + 1) % 3] == v[(i + 2) % 3]) {
                (TriangleType::Scarf, Some(i))
            } else {
                (TriangleType::Plain, None)
            }
        } else if e[0] == e[1] && e[1] == e[2] {
            if d[0] == d[1] && d[1] == d[2] {
                (TriangleType::L31, None)
            } else {
                (TriangleType::DunceHat, None)
            }
        } else {
            let i = (0..3)
                .find(|&i| e[(i + 1) % 3] == e[(i + 2) % 3])
                .expect("exactly two sides are identified");
            if d[(i + 1) % 3] == d[(i + 2) % 3] {
                (TriangleType::Mobius, Some(i))
            } else if v[0] == v[1] && v[1] == v[2] {
                (TriangleType::Horn, Some(i))
            } else {
                (TriangleType::Cone, Some(i))
            }
        }
    }

    /// The two boundary (tetrahedron, face) slots at the ends of a
    /// boundary edge's embedding path, with the edge-end order each side
    /// inherits from the walk.
    fn boundary_edge_ends(
        &self,
        edge: usize,
    ) -> ((usize, usize, Perm4), (usize, usize, Perm4)) {
        let e = &self.edges[edge];
        debug_assert!(e.boundary);
        let front = e.embeddings[0];
        let back = *e.embeddings.last().unwrap();
        let fmap = self.tet_edge_mapping[front.tet][front.edge];
        let bmap = self.tet_edge_mapping[back.tet][back.edge];
        (
            (front.tet, fmap.apply(2), fmap),
            (back.tet, bmap.apply(3), bmap),
        )
    }

    fn build_boundary_components(&mut self, _tets: &[Tetrahedron]) {
        let boundary_triangles: Vec<usize> = (0..self.triangles.len())
            .filter(|&i| self.triangles[i].is_boundary())
            .collect();

        // Group boundary triangles into connected pieces across boundary
        // edges, and propagate surface orientations at the same time.
        let nt = self.triangles.len();
        let mut uf = UnionFind::new(nt);
        let mut parity = ParityUnionFind::new(nt);
        let mut clashes = Vec::new();
        for edge in 0..self.edges.len() {
            if !self.edges[edge].boundary {
                continue;
            }
            let ((t1, f1, m1), (t2, f2, m2)) = self.boundary_edge_ends(edge);
            let tri1 = self.tet_triangle[t1][f1];
            let tri2 = self.tet_triangle[t2][f2];
            uf.union(tri1, tri2);
            let d1 = triangle_side_forward(self.tet_triangle_mapping[t1][f1], m1);
            let d2 = triangle_side_forward(self.tet_triangle_mapping[t2][f2], m2);
            if parity.union(tri1, tri2, d1 == d2) {
                clashes.push(tri1);
            }
        }
        let mut clash = vec![false; nt];
        for c in clashes {
            clash[parity.find(c).0] = true;
        }

        let mut bc_of_root: Vec<Option<usize>> = vec![None; nt];
        for &tri in &boundary_triangles {
            let root = uf.find(tri);
            let bc = match bc_of_root[root] {
                Some(bc) => bc,
                None => {
                    let bc = self.boundary_components.len();
                    bc_of_root[root] = Some(bc);
                    self.boundary_components.push(BoundaryComponent {
                        kind: BoundaryKind::Real {
                            triangles: Vec::new(),
                            edges: Vec::new(),
                            vertices: Vec::new(),
                        },
                        component: self.triangles[tri].component,
                        euler: 0,
                        orientable: true,
                    });
                    bc
                }
            };
            self.triangles[tri].boundary_component = Some(bc);
            if let BoundaryKind::Real { triangles, .. } =
                &mut self.boundary_components[bc].kind
            {
                triangles.push(tri);
            }
        }

        // Attach boundary edges and vertices, then tally Euler
        // characteristics over the ambient classes.
        for edge in 0..self.edges.len() {
            if !self.edges[edge].boundary {
                continue;
            }
            let ((t1, f1, _), _) = self.boundary_edge_ends(edge);
            let bc = self.triangles[self.tet_triangle[t1][f1]]
                .boundary_component
                .expect("end face of a boundary edge is a boundary triangle");
            self.edges[edge].boundary_component = Some(bc);
            if let BoundaryKind::Real { edges, .. } = &mut self.boundary_components[bc].kind {
                edges.push(edge);
            }
        }
        for tri in &boundary_triangles {
            let bc = self.triangles[*tri].boundary_component.unwrap();
            for i in 0..3 {
                let v = self.triangle_vertex(*tri, i);
                if self.vertices[v].boundary_component.is_none() {
                    self.vertices[v].boundary_component = Some(bc);
                    if let BoundaryKind::Real { vertices, .. } =
                        &mut self.boundary_components[bc].kind
                    {
                        vertices.push(v);
                    }
                }
            }
        }
        for bc in &mut self.boundary_components {
            if let BoundaryKind::Real {
                triangles,
                edges,
                vertices,
            } = &bc.kind
            {
                bc.euler =
                    vertices.len() as i64 - edges.len() as i64 + triangles.len() as i64;
                bc.orientable = !clash[parity.find(triangles[0]).0];
            }
        }

        // Ideal and invalid vertices away from the real boundary each form
        // their own boundary component.
        for v in 0..self.vertices.len() {
            if self.vertices[v].boundary_component.is_some() {
                continue;
            }
            let link = self.vertices[v].link();
            let kind = match link {
                VertexLink::Sphere | VertexLink::Disc => continue,
                VertexLink::Invalid => BoundaryKind::InvalidVertex { vertex: v },
                _ => BoundaryKind::Ideal { vertex: v },
            };
            let bc = self.boundary_components.len();
            self.vertices[v].boundary_component = Some(bc);
            self.boundary_components.push(BoundaryComponent {
                kind,
                component: self.vertices[v].component,
                euler: self.vertices[v].link_euler,
                orientable: self.vertices[v].link_orientable,
            });
        }
    }

    fn finish_components(&mut self) {
        for bc in &self.boundary_components {
            self.components[bc.component].closed = false;
        }
        for vertex in &self.vertices {
            if vertex.is_ideal() {
                self.components[vertex.component].ideal = true;
            }
            if !vertex.is_valid() {
                self.components[vertex.component].valid = false;
            }
        }
        for edge in &self.edges {
            if !edge.valid {
                self.components[edge.component].valid = false;
            }
        }
    }
}

/// Whether `x -> y` follows the ascending cyclic order of the three labels
/// other than `apex`.
fn cyclic_forward(apex: usize, x: usize, y: usize) -> bool {
    let labels: Vec<usize> = (0..4).filter(|&w| w != apex).collect();
    let pos = |z| labels.iter().position(|&w| w == z).unwrap();
    (pos(x) + 1) % 3 == pos(y)
}

/// Whether the edge end order given by `edge_map` runs forward in the
/// cyclic order of the boundary triangle whose mapping is `tri_map`.
fn triangle_side_forward(tri_map: Perm4, edge_map: Perm4) -> bool {
    let i0 = tri_map.preimage(edge_map.apply(0));
    let i1 = tri_map.preimage(edge_map.apply(1));
    debug_assert!(i0 < 3 && i1 < 3);
    (i0 + 1) % 3 == i1
}

/// Plain union-find with path halving.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> UnionFind {
        UnionFind {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Union-find carrying a relative orientation bit along every link.
/// `union` returns true when the requested relation contradicts the
/// existing one (the structure being 2-coloured is non-orientable).
struct ParityUnionFind {
    parent: Vec<usize>,
    // Parity of the path from each node to its parent: true = flipped.
    flip: Vec<bool>,
}

impl ParityUnionFind {
    fn new(n: usize) -> ParityUnionFind {
        ParityUnionFind {
            parent: (0..n).collect(),
            flip: vec![false; n],
        }
    }

    fn find(&mut self, x: usize) -> (usize, bool) {
        if self.parent[x] == x {
            return (x, false);
        }
        let (root, parity) = self.find(self.parent[x]);
        self.parent[x] = root;
        self.flip[x] ^= parity;
        (root, self.flip[x])
    }

    /// Records that `a` and `b` differ by `flip`; reports a contradiction.
    fn union(&mut self, a: usize, b: usize, flip: bool) -> bool {
        let (ra, pa) = self.find(a);
        let (rb, pb) = self.find(b);
        if ra == rb {
            return (pa ^ pb) != flip;
        }
        self.parent[ra] = rb;
        self.flip[ra] = pa ^ pb ^ flip;
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::perm::Perm4;
    use crate::skeleton::{TriangleType, VertexLink};
    use crate::triangulation::Triangulation;

    fn p(a: u8, b: u8, c: u8, d: u8) -> Perm4 {
        Perm4::from_images(a, b, c, d).unwrap()
    }

    #[test]
    fn test_single_tetrahedron() {
        let mut tri = Triangulation::new();
        tri.new_tetrahedron();
        assert_eq!(tri.num_components(), 1);
        assert_eq!(tri.num_vertices(), 4);
        assert_eq!(tri.num_edges(), 6);
        assert_eq!(tri.num_triangles(), 4);
        assert_eq!(tri.num_boundary_components(), 1);
        let bc = &tri.skeleton().boundary_components()[0];
        assert!(bc.is_real());
        assert_eq!(bc.num_triangles(), 4);
        assert_eq!(bc.euler_characteristic(), 2);
        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert!(!tri.is_closed());
        for v in tri.skeleton().vertices() {
            assert_eq!(v.link(), VertexLink::Disc);
        }
        for e in tri.skeleton().edges() {
            assert!(e.is_valid() && e.is_boundary());
            assert_eq!(e.degree(), 1);
        }
    }

    #[test]
    fn test_two_tetrahedron_sphere() {
        // Glue two tetrahedra along all four faces by the identity: the
        // double of a tetrahedron, a 3-sphere.
        let mut tri = Triangulation::new();
        let a = tri.new_tetrahedron();
        let b = tri.new_tetrahedron();
        for f in 0..4 {
            tri.join(a, f, b, Perm4::IDENTITY).unwrap();
        }
        assert_eq!(tri.num_components(), 1);
        assert_eq!(tri.num_vertices(), 4);
        assert_eq!(tri.num_edges(), 6);
        assert_eq!(tri.num_triangles(), 4);
        assert!(tri.is_closed());
        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert_eq!(tri.euler_characteristic(), 0);
        for v in tri.skeleton().vertices() {
            assert_eq!(v.link(), VertexLink::Sphere);
        }
        for e in tri.skeleton().edges() {
            assert_eq!(e.degree(), 2);
            assert!(!e.is_boundary());
        }
    }

    #[test]
    fn test_snapped_ball_counts() {
        // Fold face 0 onto face 1 across the 0-1 transposition.
        let mut tri = Triangulation::new();
        let t = tri.new_tetrahedron();
        tri.join(t, 0, t, p(1, 0, 2, 3)).unwrap();
        let skel = tri.skeleton();
        assert_eq!(tri.num_triangles(), 3);
        assert_eq!(tri.num_boundary_components(), 1);
        assert_eq!(skel.boundary_components()[0].num_triangles(), 2);
        // One internal edge (the degree-one edge 23), and the equator 01
        // plus two more classes on the boundary.
        let internal: Vec<_> = skel.edges().iter().filter(|e| !e.is_boundary()).collect();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].degree(), 1);
        assert_eq!(skel.edges().len(), 4);
        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert_eq!(skel.boundary_components()[0].euler_characteristic(), 2);
    }

    #[test]
    fn test_invalid_edge_detected() {
        // Glue face 2 to face 3 reversing edge 01.
        let mut tri = Triangulation::new();
        let t = tri.new_tetrahedron();
        tri.join(t, 2, t, p(1, 0, 3, 2)).unwrap();
        let bad: Vec<_> = tri
            .skeleton()
            .edges()
            .iter()
            .filter(|e| !e.is_valid())
            .collect();
        assert_eq!(bad.len(), 1);
        assert!(!tri.is_valid());
    }

    #[test]
    fn test_figure_eight_knot_complement() {
        let mut tri = Triangulation::new();
        let r = tri.new_tetrahedron();
        let s = tri.new_tetrahedron();
        tri.join(r, 0, s, p(1, 3, 0, 2)).unwrap();
        tri.join(r, 1, s, p(2, 0, 3, 1)).unwrap();
        tri.join(r, 2, s, p(0, 3, 2, 1)).unwrap();
        tri.join(r, 3, s, p(2, 1, 0, 3)).unwrap();

        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert!(tri.is_connected());
        assert!(!tri.is_closed());
        assert!(tri.is_ideal());
        assert_eq!(tri.num_vertices(), 1);
        assert_eq!(tri.num_edges(), 2);
        assert_eq!(tri.num_triangles(), 4);
        assert_eq!(tri.num_boundary_components(), 1);

        let skel = tri.skeleton();
        assert_eq!(skel.vertices()[0].link(), VertexLink::Torus);
        let bc = &skel.boundary_components()[0];
        assert!(bc.is_ideal());
        assert_eq!(bc.euler_characteristic(), 0);
        assert!(bc.is_orientable());
        for e in skel.edges() {
            assert_eq!(e.degree(), 6);
            assert!(e.is_valid());
            assert!(!e.is_boundary());
        }
    }

    #[test]
    fn test_edge_ring_contract() {
        // Around every edge, consecutive embeddings are linked by the face
        // gluing composed with the (2 3) swap.
        let mut tri = Triangulation::new();
        let r = tri.new_tetrahedron();
        let s = tri.new_tetrahedron();
        tri.join(r, 0, s, p(1, 3, 0, 2)).unwrap();
        tri.join(r, 1, s, p(2, 0, 3, 1)).unwrap();
        tri.join(r, 2, s, p(0, 3, 2, 1)).unwrap();
        tri.join(r, 3, s, p(2, 1, 0, 3)).unwrap();
        let skel = tri.skeleton();
        for edge in skel.edges() {
            let embs = edge.embeddings();
            for (i, emb) in embs.iter().enumerate() {
                let map = skel.tet_edge_mapping(emb.tet, emb.edge);
                let exit = map.apply(3);
                let tet = tri.tetrahedron(emb.tet).unwrap();
                let gluing = tet.adjacent_gluing(exit).unwrap();
                let next = &embs[(i + 1) % embs.len()];
                let next_map = skel.tet_edge_mapping(next.tet, next.edge);
                assert_eq!(tet.adjacent_tetrahedron(exit), Some(next.tet));
                // The crossed face becomes the image of 2 on the far side.
                assert_eq!(next_map.apply(2), gluing.apply(exit));
                assert_eq!(next_map.apply(0), gluing.apply(map.apply(0)));
                assert_eq!(next_map.apply(1), gluing.apply(map.apply(1)));
            }
        }
    }

    #[test]
    fn test_triangle_types_plain() {
        let mut tri = Triangulation::new();
        tri.new_tetrahedron();
        for t in tri.skeleton().triangles() {
            assert_eq!(t.triangle_type(), TriangleType::Plain);
            assert!(!t.is_cone() && !t.is_mobius_band());
        }
    }

    #[test]
    fn test_orientation_convention() {
        let mut tri = Triangulation::new();
        let a = tri.new_tetrahedron();
        let b = tri.new_tetrahedron();
        let g = p(1, 3, 0, 2);
        tri.join(a, 0, b, g).unwrap();
        let skel = tri.skeleton();
        assert_eq!(skel.tet_orientation(a), 1);
        assert_eq!(
            skel.tet_orientation(b),
            -g.sign() * skel.tet_orientation(a)
        );
    }
}
